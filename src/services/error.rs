// 发现服务错误类型定义

use thiserror::Error;

use crate::external::FetchError;

/// 搜索与浏览操作的统一错误类型
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// 上游调用失败（传输错误或非 2xx 状态）
    #[error("上游请求失败: {0}")]
    FetchFailed(#[from] FetchError),

    /// 搜索条件不合法，例如页码小于 1
    #[error("参数错误: {0}")]
    InvalidArgument(String),

    /// 在任何 submit 之前调用了 load_more
    #[error("当前没有进行中的搜索")]
    NoActiveSearch,

    /// 响应到达时已有更新的请求，结果被丢弃
    #[error("请求已被第 {generation} 代请求取代")]
    Superseded { generation: u64 },
}

/// 偏好设置持久化错误
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}
