pub mod cache;
pub mod error;
pub mod mangadex;

use async_trait::async_trait;
use std::sync::Arc;

pub use cache::{CacheStats, CatalogCache};
pub use error::FetchError;
pub use mangadex::{CoverSize, MangaDexClient};

use crate::models::{
    MangaListResponse, MangaStatistics, MangaTag, StatisticsResponse, TagListResponse,
};

/// 封面图片数据
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 上游漫画目录服务
///
/// 所有调用都是单次 GET，不重试；非 2xx 状态与传输错误统一返回 `FetchError`。
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 按查询参数搜索漫画
    async fn search_manga(&self, params: &[(String, String)]) -> Result<MangaListResponse, FetchError>;

    /// 原样转发查询参数，返回未解析的 JSON
    async fn search_raw(&self, params: &[(String, String)]) -> Result<serde_json::Value, FetchError>;

    /// 获取全部标签
    async fn list_tags(&self) -> Result<TagListResponse, FetchError>;

    /// 获取单部漫画的统计信息
    async fn statistics(&self, manga_id: &str) -> Result<StatisticsResponse, FetchError>;

    /// 获取封面图片
    async fn cover_image(
        &self,
        manga_id: &str,
        file_name: &str,
        size: CoverSize,
    ) -> Result<CoverImage, FetchError>;
}

/// 带缓存的目录客户端
#[derive(Clone)]
pub struct ExternalApiClient {
    source: Arc<dyn CatalogSource>,
    pub cache: CatalogCache,
}

impl ExternalApiClient {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: CatalogCache::new(),
        }
    }

    pub fn source(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.source)
    }

    /// 获取标签列表（带缓存）
    pub async fn get_tags(&self) -> Result<Vec<MangaTag>, FetchError> {
        if let Some(tags) = self.cache.get_tags().await {
            tracing::debug!("Cache hit for tag list");
            return Ok(tags);
        }

        let response = self.source.list_tags().await?;
        let tags: Vec<MangaTag> = response.data.iter().map(MangaTag::from).collect();

        self.cache.set_tags(tags.clone()).await;
        tracing::debug!("Cached {} tags", tags.len());

        Ok(tags)
    }

    /// 获取统计信息（带缓存）
    pub async fn get_statistics(&self, manga_id: &str) -> Result<MangaStatistics, FetchError> {
        if let Some(stats) = self.cache.get_statistics(manga_id).await {
            tracing::debug!("Cache hit for statistics: {}", manga_id);
            return Ok(stats);
        }

        let mut response = self.source.statistics(manga_id).await?;
        let stats = response.statistics.remove(manga_id).ok_or_else(|| {
            FetchError::Decode(format!("statistics missing for manga {}", manga_id))
        })?;

        self.cache.set_statistics(manga_id, stats.clone()).await;
        Ok(stats)
    }

    /// 获取缓存统计信息
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// 立即淘汰过期缓存
    pub async fn cleanup_cache(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// 清空所有缓存
    pub async fn clear_cache(&self) {
        self.cache.clear_all().await;
    }
}
