// 浏览页数据
//
// 首页和分类页并行预取多个板块。每个板块独立成败：
// 失败的板块使用占位数据并标记 `placeholder`，不影响其他板块。

use futures::future::join_all;
use serde::Serialize;
use std::str::FromStr;

use crate::external::ExternalApiClient;
use crate::models::{
    ContentRating, Demographic, FilterSpec, MangaStatistics, MangaSummary, MangaTag, SortKey,
};
use crate::services::error::DiscoveryError;
use crate::services::placeholder::{default_tags, placeholder_manga, placeholder_statistics};
use crate::services::query_builder::fetch_page;

/// 分类预览每个读者群的条目数
pub const CATEGORY_PREVIEW_LIMIT: u32 = 4;

/// 一个浏览板块
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverySection {
    pub key: String,
    pub items: Vec<MangaSummary>,
    pub placeholder: bool,
}

/// 分类页的一页结果
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub demographic: Demographic,
    pub sort: CategorySort,
    pub page: u32,
    pub items: Vec<MangaSummary>,
    pub total: u64,
    pub has_more: bool,
    pub placeholder: bool,
}

/// 带回退标记的数据
#[derive(Debug, Clone, Serialize)]
pub struct WithFallback<T> {
    pub data: T,
    pub placeholder: bool,
}

/// 分类页排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySort {
    #[default]
    Popular,
    Rating,
    Recent,
}

impl CategorySort {
    pub fn sort_key(&self) -> SortKey {
        match self {
            CategorySort::Popular => SortKey::Popularity,
            CategorySort::Rating => SortKey::Rating,
            CategorySort::Recent => SortKey::LastUpdated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategorySort::Popular => "popular",
            CategorySort::Rating => "rating",
            CategorySort::Recent => "recent",
        }
    }
}

impl FromStr for CategorySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(CategorySort::Popular),
            "rating" => Ok(CategorySort::Rating),
            "recent" => Ok(CategorySort::Recent),
            _ => Err(format!("Invalid category sort: {}", s)),
        }
    }
}

/// 浏览服务
#[derive(Clone)]
pub struct DiscoveryService {
    client: ExternalApiClient,
    page_size: u32,
}

impl DiscoveryService {
    pub fn new(client: ExternalApiClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    pub fn client(&self) -> &ExternalApiClient {
        &self.client
    }

    fn browse_spec(sort_key: SortKey) -> FilterSpec {
        let mut spec = FilterSpec::sorted_by(sort_key);
        spec.content_ratings.extend(ContentRating::BROWSABLE);
        spec
    }

    /// 请求一个板块，成功结果缓存，失败时回退到占位数据
    async fn load_section(&self, key: String, spec: FilterSpec, limit: u32) -> DiscoverySection {
        let cache_key = format!("{}:{}:{}", key, spec.page, limit);

        if let Some(items) = self.client.cache.get_section(&cache_key).await {
            tracing::debug!("Cache hit for section: {}", cache_key);
            return DiscoverySection {
                key,
                items,
                placeholder: false,
            };
        }

        match fetch_page(self.client.source().as_ref(), &spec, limit).await {
            Ok(page) => {
                self.client.cache.set_section(&cache_key, page.items.clone()).await;
                DiscoverySection {
                    key,
                    items: page.items,
                    placeholder: false,
                }
            }
            Err(e) => {
                tracing::warn!("Section {} unavailable, using placeholder data: {}", key, e);
                DiscoverySection {
                    key,
                    items: placeholder_manga(limit as usize),
                    placeholder: true,
                }
            }
        }
    }

    /// 首页三个板块：热门、最近更新、高分
    pub async fn home_sections(&self, limit: u32) -> Result<Vec<DiscoverySection>, DiscoveryError> {
        Self::check_limit(limit)?;

        let (popular, recent, top_rated) = tokio::join!(
            self.load_section(
                "popular".to_string(),
                Self::browse_spec(SortKey::Popularity),
                limit
            ),
            self.load_section(
                "recently_updated".to_string(),
                Self::browse_spec(SortKey::LastUpdated),
                limit
            ),
            self.load_section(
                "top_rated".to_string(),
                Self::browse_spec(SortKey::Rating),
                limit
            ),
        );

        Ok(vec![popular, recent, top_rated])
    }

    /// 四个读者群的分类预览
    pub async fn category_previews(&self) -> Vec<DiscoverySection> {
        let loads = Demographic::ALL.iter().map(|demographic| {
            self.load_section(
                format!("category:{}", demographic.as_str()),
                FilterSpec::for_demographic(*demographic, SortKey::Popularity),
                CATEGORY_PREVIEW_LIMIT,
            )
        });

        join_all(loads).await
    }

    /// 单个读者群的分页列表
    pub async fn category_listing(
        &self,
        demographic: Demographic,
        sort: CategorySort,
        page: u32,
    ) -> Result<CategoryListing, DiscoveryError> {
        let spec = FilterSpec::for_demographic(demographic, sort.sort_key()).with_page(page);

        match fetch_page(self.client.source().as_ref(), &spec, self.page_size).await {
            Ok(result) => {
                let loaded = u64::from(page - 1) * u64::from(self.page_size) + result.items.len() as u64;
                Ok(CategoryListing {
                    demographic,
                    sort,
                    page,
                    has_more: !result.items.is_empty() && loaded < result.total_available,
                    total: result.total_available,
                    items: result.items,
                    placeholder: false,
                })
            }
            Err(DiscoveryError::FetchFailed(e)) => {
                tracing::warn!(
                    "Category {} unavailable, using placeholder data: {}",
                    demographic.as_str(),
                    e
                );
                let items = placeholder_manga(self.page_size as usize);
                Ok(CategoryListing {
                    demographic,
                    sort,
                    page,
                    total: items.len() as u64,
                    has_more: false,
                    items,
                    placeholder: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// 标签列表，失败时使用默认标签
    pub async fn tags(&self) -> WithFallback<Vec<MangaTag>> {
        match self.client.get_tags().await {
            Ok(tags) => WithFallback {
                data: tags,
                placeholder: false,
            },
            Err(e) => {
                tracing::warn!("Tag list unavailable, using default tags: {}", e);
                WithFallback {
                    data: default_tags(),
                    placeholder: true,
                }
            }
        }
    }

    /// 统计信息，失败时使用占位统计
    pub async fn statistics(&self, manga_id: &str) -> WithFallback<MangaStatistics> {
        match self.client.get_statistics(manga_id).await {
            Ok(stats) => WithFallback {
                data: stats,
                placeholder: false,
            },
            Err(e) => {
                tracing::warn!("Statistics for {} unavailable, using placeholder: {}", manga_id, e);
                WithFallback {
                    data: placeholder_statistics(),
                    placeholder: true,
                }
            }
        }
    }

    fn check_limit(limit: u32) -> Result<(), DiscoveryError> {
        if limit == 0 || limit > 100 {
            return Err(DiscoveryError::InvalidArgument(format!(
                "limit must be between 1 and 100, got {}",
                limit
            )));
        }
        Ok(())
    }
}
