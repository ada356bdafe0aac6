use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::external::CoverSize;

/// 封面在上游按文件名寻址，内容不会变化
const COVER_CACHE_CONTROL: &str = "public, max-age=31536000";

#[derive(Debug, Deserialize)]
pub struct CoverParams {
    pub size: Option<String>,
}

/// 封面图片代理
pub async fn proxy_cover(
    State(state): State<AppState>,
    Path((manga_id, file_name)): Path<(String, String)>,
    Query(params): Query<CoverParams>,
) -> ApiResult<Response> {
    let size = match params.size.as_deref() {
        Some(size) => size.parse::<CoverSize>().map_err(ApiError::BadRequest)?,
        None => CoverSize::default(),
    };

    if manga_id.is_empty() || file_name.is_empty() {
        return Err(ApiError::BadRequest("manga id and file name are required".to_string()));
    }

    let image = state
        .external_client
        .source()
        .cover_image(&manga_id, &file_name, size)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CACHE_CONTROL, COVER_CACHE_CONTROL)
        .body(Body::from(image.bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build cover response: {}", e)))
}
