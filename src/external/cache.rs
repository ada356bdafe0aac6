use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{MangaStatistics, MangaSummary, MangaTag};

/// 标签列表几乎不变，缓存24小时
const TAGS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 统计数据缓存10分钟
const STATISTICS_TTL: Duration = Duration::from_secs(10 * 60);

/// 首页/分类板块缓存1小时
const SECTION_TTL: Duration = Duration::from_secs(60 * 60);

const STATISTICS_MAX_CAPACITY: u64 = 10_000;
const SECTION_MAX_CAPACITY: u64 = 1_000;

/// 目录响应缓存
///
/// 只缓存浏览类数据；用户主动发起的搜索始终直达上游。
/// 过期条目由 moka 自行淘汰。
#[derive(Clone)]
pub struct CatalogCache {
    tags: Cache<(), Vec<MangaTag>>,
    statistics: Cache<String, MangaStatistics>,
    sections: Cache<String, Vec<MangaSummary>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::with_ttls(TAGS_TTL, STATISTICS_TTL, SECTION_TTL)
    }

    pub fn with_ttls(tags_ttl: Duration, statistics_ttl: Duration, section_ttl: Duration) -> Self {
        Self {
            tags: Cache::builder().max_capacity(1).time_to_live(tags_ttl).build(),
            statistics: Cache::builder()
                .max_capacity(STATISTICS_MAX_CAPACITY)
                .time_to_live(statistics_ttl)
                .build(),
            sections: Cache::builder()
                .max_capacity(SECTION_MAX_CAPACITY)
                .time_to_live(section_ttl)
                .build(),
        }
    }

    pub async fn get_tags(&self) -> Option<Vec<MangaTag>> {
        self.tags.get(&()).await
    }

    pub async fn set_tags(&self, tags: Vec<MangaTag>) {
        self.tags.insert((), tags).await;
    }

    pub async fn get_statistics(&self, manga_id: &str) -> Option<MangaStatistics> {
        self.statistics.get(manga_id).await
    }

    pub async fn set_statistics(&self, manga_id: &str, stats: MangaStatistics) {
        self.statistics.insert(manga_id.to_string(), stats).await;
    }

    pub async fn get_section(&self, key: &str) -> Option<Vec<MangaSummary>> {
        self.sections.get(key).await
    }

    pub async fn set_section(&self, key: &str, items: Vec<MangaSummary>) {
        self.sections.insert(key.to_string(), items).await;
    }

    /// 立即执行挂起的淘汰任务
    pub async fn run_pending_tasks(&self) {
        self.tags.run_pending_tasks().await;
        self.statistics.run_pending_tasks().await;
        self.sections.run_pending_tasks().await;
    }

    /// 清空所有缓存
    pub async fn clear_all(&self) {
        self.tags.invalidate_all();
        self.statistics.invalidate_all();
        self.sections.invalidate_all();
        self.run_pending_tasks().await;
    }

    /// 条目数为近似值，刚写入的条目可能尚未计入
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            tags_cache_size: self.tags.entry_count(),
            statistics_cache_size: self.statistics.entry_count(),
            section_cache_size: self.sections.entry_count(),
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 缓存统计信息
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub tags_cache_size: u64,
    pub statistics_cache_size: u64,
    pub section_cache_size: u64,
}
