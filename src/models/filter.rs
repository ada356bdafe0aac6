use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::services::error::DiscoveryError;

/// 连载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Ongoing => "ongoing",
            PublicationStatus::Completed => "completed",
            PublicationStatus::Hiatus => "hiatus",
            PublicationStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PublicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(PublicationStatus::Ongoing),
            "completed" => Ok(PublicationStatus::Completed),
            "hiatus" => Ok(PublicationStatus::Hiatus),
            "cancelled" => Ok(PublicationStatus::Cancelled),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// 目标读者群
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Demographic {
    Shounen,
    Seinen,
    Shoujo,
    Josei,
}

impl Demographic {
    pub const ALL: [Demographic; 4] = [
        Demographic::Shounen,
        Demographic::Seinen,
        Demographic::Shoujo,
        Demographic::Josei,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Demographic::Shounen => "shounen",
            Demographic::Seinen => "seinen",
            Demographic::Shoujo => "shoujo",
            Demographic::Josei => "josei",
        }
    }
}

impl FromStr for Demographic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shounen" => Ok(Demographic::Shounen),
            "seinen" => Ok(Demographic::Seinen),
            "shoujo" => Ok(Demographic::Shoujo),
            "josei" => Ok(Demographic::Josei),
            _ => Err(format!("Invalid demographic: {}", s)),
        }
    }
}

/// 内容分级，从宽松到严格排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Erotica,
    Pornographic,
}

impl ContentRating {
    /// 浏览页默认只展示的分级
    pub const BROWSABLE: [ContentRating; 2] = [ContentRating::Safe, ContentRating::Suggestive];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::Safe => "safe",
            ContentRating::Suggestive => "suggestive",
            ContentRating::Erotica => "erotica",
            ContentRating::Pornographic => "pornographic",
        }
    }
}

impl FromStr for ContentRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(ContentRating::Safe),
            "suggestive" => Ok(ContentRating::Suggestive),
            "erotica" => Ok(ContentRating::Erotica),
            "pornographic" => Ok(ContentRating::Pornographic),
            _ => Err(format!("Invalid content rating: {}", s)),
        }
    }
}

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Popularity,
    Rating,
    LastUpdated,
    CreatedAt,
    Title,
}

impl SortKey {
    /// 上游 `order[...]` 参数使用的字段名
    pub fn upstream_field(&self) -> &'static str {
        match self {
            SortKey::Popularity => "followedCount",
            SortKey::Rating => "rating",
            SortKey::LastUpdated => "latestUploadedChapter",
            SortKey::CreatedAt => "createdAt",
            SortKey::Title => "title",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    // 同时接受上游字段名，方便直接转发前端旧参数
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popularity" | "followedCount" => Ok(SortKey::Popularity),
            "rating" => Ok(SortKey::Rating),
            "last_updated" | "latestUploadedChapter" => Ok(SortKey::LastUpdated),
            "created_at" | "createdAt" => Ok(SortKey::CreatedAt),
            "title" => Ok(SortKey::Title),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

/// 多标签匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagMatchMode {
    And,
    Or,
}

impl TagMatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagMatchMode::And => "AND",
            TagMatchMode::Or => "OR",
        }
    }
}

impl FromStr for TagMatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(TagMatchMode::And),
            "OR" => Ok(TagMatchMode::Or),
            _ => Err(format!("Invalid tag mode: {}", s)),
        }
    }
}

/// 保持插入顺序的标签集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn contains(&self, tag_id: &str) -> bool {
        self.0.iter().any(|t| t == tag_id)
    }

    fn insert(&mut self, tag_id: &str) -> bool {
        if self.contains(tag_id) {
            return false;
        }
        self.0.push(tag_id.to_string());
        true
    }

    fn remove(&mut self, tag_id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag_id);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 用户选择的搜索条件
///
/// 包含/排除标签始终互斥：把标签加入一侧会同时把它从另一侧移除，
/// 因此标签字段只能通过下面的方法修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub title_query: Option<String>,
    included_tags: TagSet,
    excluded_tags: TagSet,
    pub included_tags_mode: Option<TagMatchMode>,
    pub excluded_tags_mode: Option<TagMatchMode>,
    pub statuses: BTreeSet<PublicationStatus>,
    pub demographics: BTreeSet<Demographic>,
    pub content_ratings: BTreeSet<ContentRating>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub page: u32,
}

impl Default for FilterSpec {
    /// 默认条件：无过滤，按人气降序，第一页
    fn default() -> Self {
        Self {
            title_query: None,
            included_tags: TagSet::default(),
            excluded_tags: TagSet::default(),
            included_tags_mode: None,
            excluded_tags_mode: None,
            statuses: BTreeSet::new(),
            demographics: BTreeSet::new(),
            content_ratings: BTreeSet::new(),
            sort_key: SortKey::Popularity,
            sort_direction: SortDirection::Desc,
            page: 1,
        }
    }
}

impl FilterSpec {
    pub fn included_tags(&self) -> &TagSet {
        &self.included_tags
    }

    pub fn excluded_tags(&self) -> &TagSet {
        &self.excluded_tags
    }

    /// 加入包含标签（并从排除标签中移除）
    pub fn include_tag(&mut self, tag_id: &str) {
        self.excluded_tags.remove(tag_id);
        self.included_tags.insert(tag_id);
    }

    /// 加入排除标签（并从包含标签中移除）
    pub fn exclude_tag(&mut self, tag_id: &str) {
        self.included_tags.remove(tag_id);
        self.excluded_tags.insert(tag_id);
    }

    /// 取消标签的任何选择
    pub fn clear_tag(&mut self, tag_id: &str) {
        self.included_tags.remove(tag_id);
        self.excluded_tags.remove(tag_id);
    }

    /// 切换包含状态：已包含则取消，否则包含
    pub fn toggle_included_tag(&mut self, tag_id: &str) {
        if self.included_tags.contains(tag_id) {
            self.included_tags.remove(tag_id);
        } else {
            self.include_tag(tag_id);
        }
    }

    /// 切换排除状态：已排除则取消，否则排除
    pub fn toggle_excluded_tag(&mut self, tag_id: &str) {
        if self.excluded_tags.contains(tag_id) {
            self.excluded_tags.remove(tag_id);
        } else {
            self.exclude_tag(tag_id);
        }
    }

    /// 非空白的标题关键词
    pub fn title(&self) -> Option<&str> {
        self.title_query
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// 同一条件的另一页
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// 指定排序的默认条件
    pub fn sorted_by(sort_key: SortKey) -> Self {
        let mut spec = Self::default();
        spec.sort_key = sort_key;
        spec
    }

    /// 按读者群浏览时使用的条件
    pub fn for_demographic(demographic: Demographic, sort_key: SortKey) -> Self {
        let mut spec = Self::sorted_by(sort_key);
        spec.demographics.insert(demographic);
        spec.content_ratings.extend(ContentRating::BROWSABLE);
        spec
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "title={:?} +tags={} -tags={} sort={}:{} page={}",
            self.title(),
            self.included_tags.len(),
            self.excluded_tags.len(),
            self.sort_key.upstream_field(),
            self.sort_direction.as_str(),
            self.page
        )
    }
}

/// 搜索请求DTO（前端提交的原始条件）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub title: Option<String>,
    pub included_tags: Vec<String>,
    pub excluded_tags: Vec<String>,
    pub included_tags_mode: Option<String>,
    pub excluded_tags_mode: Option<String>,
    pub status: Vec<String>,
    pub demographic: Vec<String>,
    pub content_rating: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
}

fn parse_all<T: FromStr<Err = String> + Ord>(values: &[String]) -> Result<BTreeSet<T>, DiscoveryError> {
    values
        .iter()
        .map(|v| v.parse::<T>().map_err(DiscoveryError::InvalidArgument))
        .collect()
}

impl TryFrom<SearchRequest> for FilterSpec {
    type Error = DiscoveryError;

    fn try_from(req: SearchRequest) -> Result<Self, Self::Error> {
        let page = req.page.unwrap_or(1);
        if page < 1 {
            return Err(DiscoveryError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        let page = u32::try_from(page)
            .map_err(|_| DiscoveryError::InvalidArgument(format!("page out of range: {}", page)))?;

        if let Some(overlap) = req
            .included_tags
            .iter()
            .find(|t| req.excluded_tags.contains(t))
        {
            return Err(DiscoveryError::InvalidArgument(format!(
                "tag {} cannot be both included and excluded",
                overlap
            )));
        }

        let mut spec = FilterSpec {
            title_query: req.title.filter(|t| !t.trim().is_empty()),
            included_tags_mode: req
                .included_tags_mode
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(DiscoveryError::InvalidArgument)?,
            excluded_tags_mode: req
                .excluded_tags_mode
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(DiscoveryError::InvalidArgument)?,
            statuses: parse_all(&req.status)?,
            demographics: parse_all(&req.demographic)?,
            content_ratings: parse_all(&req.content_rating)?,
            sort_key: req
                .sort_by
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(DiscoveryError::InvalidArgument)?
                .unwrap_or(SortKey::Popularity),
            sort_direction: req
                .sort_order
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(DiscoveryError::InvalidArgument)?
                .unwrap_or(SortDirection::Desc),
            page,
            ..FilterSpec::default()
        };

        for tag in &req.included_tags {
            spec.include_tag(tag);
        }
        for tag in &req.excluded_tags {
            spec.exclude_tag(tag);
        }

        Ok(spec)
    }
}
