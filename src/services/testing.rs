// 单元测试用的内存目录服务

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::external::{CatalogSource, CoverImage, CoverSize, FetchError};
use crate::models::{MangaListResponse, StatisticsResponse, TagListResponse};

/// 按 offset/limit 生成条目的假目录
///
/// 条目 id 形如 `{title}-{n}`，未指定标题时为 `all-{n}`。
pub struct MockSource {
    pub total: u64,
    pub content_rating: &'static str,
    pub fail: AtomicBool,
    calls: AtomicUsize,
    delays: Mutex<VecDeque<Duration>>,
    requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl MockSource {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            content_rating: "safe",
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            delays: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let source = Self::new(0);
        source.set_failing(true);
        source
    }

    pub fn with_rating(mut self, rating: &'static str) -> Self {
        self.content_rating = rating;
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// 依次为后续请求设置延迟
    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.requests.lock().unwrap().clone()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    async fn before_call(&self, params: &[(String, String)]) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(params.to_vec());

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status(503));
        }
        Ok(())
    }

    pub fn page_json(&self, params: &[(String, String)]) -> serde_json::Value {
        let limit: u64 = Self::param(params, "limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);
        let offset: u64 = Self::param(params, "offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let prefix = Self::param(params, "title").unwrap_or("all");

        let end = (offset + limit).min(self.total);
        let data: Vec<_> = (offset..end)
            .map(|n| {
                json!({
                    "id": format!("{}-{}", prefix, n),
                    "type": "manga",
                    "attributes": {
                        "title": { "en": format!("{} {}", prefix, n) },
                        "description": {},
                        "status": "ongoing",
                        "contentRating": self.content_rating,
                        "tags": []
                    },
                    "relationships": []
                })
            })
            .collect();

        json!({
            "result": "ok",
            "data": data,
            "limit": limit,
            "offset": offset,
            "total": self.total
        })
    }
}

#[async_trait]
impl CatalogSource for MockSource {
    async fn search_manga(&self, params: &[(String, String)]) -> Result<MangaListResponse, FetchError> {
        self.before_call(params).await?;
        serde_json::from_value(self.page_json(params)).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn search_raw(&self, params: &[(String, String)]) -> Result<serde_json::Value, FetchError> {
        self.before_call(params).await?;
        Ok(self.page_json(params))
    }

    async fn list_tags(&self) -> Result<TagListResponse, FetchError> {
        self.before_call(&[]).await?;
        serde_json::from_value(json!({
            "data": [
                { "id": "t-action", "attributes": { "name": { "en": "Action" }, "group": "genre" } }
            ]
        }))
        .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn statistics(&self, manga_id: &str) -> Result<StatisticsResponse, FetchError> {
        self.before_call(&[]).await?;
        serde_json::from_value(json!({
            "result": "ok",
            "statistics": {
                manga_id: { "rating": { "average": 7.0, "bayesian": 6.5 }, "follows": 42 }
            }
        }))
        .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn cover_image(
        &self,
        _manga_id: &str,
        _file_name: &str,
        _size: CoverSize,
    ) -> Result<CoverImage, FetchError> {
        self.before_call(&[]).await?;
        Ok(CoverImage {
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        })
    }
}
