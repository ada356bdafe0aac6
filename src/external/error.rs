// 上游目录服务调用错误
//
// 区分传输失败、非 2xx 状态码以及响应体解析失败

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("网络错误: {0}")]
    Transport(String),

    #[error("请求超时")]
    Timeout,

    #[error("HTTP 错误: 状态码 {0}")]
    Status(u16),

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("无效的请求: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidRequest(err.to_string())
    }
}
