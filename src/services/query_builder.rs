// 搜索参数构建器
//
// 把 FilterSpec 映射为上游查询参数并发起请求：
// - 空字段不产生任何参数
// - 多值字段按集合顺序展开为重复参数
// - 排序合并为单个 order[字段]=方向 参数
// - 始终附带封面、作者、画师关系数据

use crate::external::CatalogSource;
use crate::models::{FilterSpec, MangaSummary, ResultPage};
use crate::services::error::DiscoveryError;

/// 每个结果都需要的关系数据
const FIXED_INCLUDES: [&str; 3] = ["cover_art", "author", "artist"];

/// 上游查询参数构建器
pub struct SearchQueryBuilder {
    params: Vec<(String, String)>,
}

impl SearchQueryBuilder {
    fn new() -> Self {
        Self { params: Vec::new() }
    }

    fn push(&mut self, key: &str, value: impl Into<String>) {
        self.params.push((key.to_string(), value.into()));
    }

    fn push_all<'a>(&mut self, key: &str, values: impl IntoIterator<Item = &'a str>) {
        for value in values {
            self.push(key, value);
        }
    }

    /// 构建查询参数
    ///
    /// `page` 从 1 开始；`page < 1` 或 `page_size == 0` 返回 `InvalidArgument`。
    pub fn build(spec: &FilterSpec, page_size: u32) -> Result<Vec<(String, String)>, DiscoveryError> {
        if spec.page < 1 {
            return Err(DiscoveryError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                spec.page
            )));
        }
        if page_size == 0 {
            return Err(DiscoveryError::InvalidArgument(
                "page size must be positive".to_string(),
            ));
        }

        let offset = u64::from(spec.page - 1) * u64::from(page_size);
        let mut builder = Self::new();

        if let Some(title) = spec.title() {
            builder.push("title", title);
        }
        builder.push("limit", page_size.to_string());
        builder.push("offset", offset.to_string());

        if !spec.included_tags().is_empty() {
            if let Some(mode) = spec.included_tags_mode {
                builder.push("includedTagsMode", mode.as_str());
            }
        }
        if !spec.excluded_tags().is_empty() {
            if let Some(mode) = spec.excluded_tags_mode {
                builder.push("excludedTagsMode", mode.as_str());
            }
        }

        builder.push_all("includedTags[]", spec.included_tags().iter());
        builder.push_all("excludedTags[]", spec.excluded_tags().iter());
        builder.push_all("status[]", spec.statuses.iter().map(|s| s.as_str()));
        builder.push_all(
            "publicationDemographic[]",
            spec.demographics.iter().map(|d| d.as_str()),
        );
        builder.push_all(
            "contentRating[]",
            spec.content_ratings.iter().map(|r| r.as_str()),
        );

        builder.push(
            &format!("order[{}]", spec.sort_key.upstream_field()),
            spec.sort_direction.as_str(),
        );

        builder.push_all("includes[]", FIXED_INCLUDES);

        Ok(builder.params)
    }
}

/// 构建参数并请求一页结果
pub async fn fetch_page(
    source: &dyn CatalogSource,
    spec: &FilterSpec,
    page_size: u32,
) -> Result<ResultPage, DiscoveryError> {
    let params = SearchQueryBuilder::build(spec, page_size)?;
    tracing::debug!("Searching catalog: {}", spec);

    let response = source.search_manga(&params).await?;

    Ok(ResultPage {
        items: response.data.iter().map(MangaSummary::from).collect(),
        total_available: response.total,
        page_size,
        page_index: spec.page,
    })
}
