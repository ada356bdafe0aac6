use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MangaSummary;
use crate::services::content_gate::Visibility;

/// 一次上游请求得到的一页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<MangaSummary>,
    pub total_available: u64,
    pub page_size: u32,
    pub page_index: u32,
}

impl ResultPage {
    pub fn empty(page_size: u32, page_index: u32) -> Self {
        Self {
            items: Vec::new(),
            total_available: 0,
            page_size,
            page_index,
        }
    }
}

/// 一次搜索会话中累积的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccumulatedResults {
    pub items: Vec<MangaSummary>,
    pub total: u64,
    pub current_page: u32,
}

impl AccumulatedResults {
    pub fn has_more(&self) -> bool {
        (self.items.len() as u64) < self.total
    }
}

/// 附带可见性判断的条目
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub manga: MangaSummary,
    pub sensitive: bool,
    pub visibility: Visibility,
}

/// 搜索会话响应DTO
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub items: Vec<ItemView>,
    pub total: u64,
    pub current_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub adult_content_enabled: bool,
}
