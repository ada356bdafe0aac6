use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::external::FetchError;
use crate::services::{DiscoveryError, PreferenceError};

/// 统一的API错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 未找到资源
    NotFound(String),
    /// 请求参数错误
    BadRequest(String),
    /// 与当前会话状态冲突
    Conflict(String),
    /// 上游目录服务错误
    ExternalService(String),
    /// 内部服务器错误
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ExternalService(msg) => write!(f, "External service error: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            DiscoveryError::FetchFailed(e) => e.into(),
            e @ (DiscoveryError::NoActiveSearch | DiscoveryError::Superseded { .. }) => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status(404) => ApiError::NotFound("Upstream resource not found".to_string()),
            e => ApiError::ExternalService(e.to_string()),
        }
    }
}

impl From<PreferenceError> for ApiError {
    fn from(err: PreferenceError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// 实现IntoResponse，将错误转换为HTTP响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::ExternalService(ref msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "external_service_error", msg.clone())
            }
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::NotFound("Session not found".to_string());
        assert_eq!(error.to_string(), "Not found: Session not found");
    }

    #[test]
    fn test_discovery_error_mapping() {
        let cases = [
            (DiscoveryError::InvalidArgument("page".into()), StatusCode::BAD_REQUEST),
            (DiscoveryError::NoActiveSearch, StatusCode::CONFLICT),
            (DiscoveryError::Superseded { generation: 3 }, StatusCode::CONFLICT),
            (DiscoveryError::FetchFailed(FetchError::Status(500)), StatusCode::BAD_GATEWAY),
            (DiscoveryError::FetchFailed(FetchError::Timeout), StatusCode::BAD_GATEWAY),
            (DiscoveryError::FetchFailed(FetchError::Status(404)), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
