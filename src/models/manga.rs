use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::filter::{ContentRating, Demographic, PublicationStatus};

pub const TITLE_PLACEHOLDER: &str = "Title not available";
pub const DESCRIPTION_PLACEHOLDER: &str = "Description not available";

/// 多语言文本（语言代码 -> 文本），保持上游给出的语言顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizedText(Vec<(String, String)>);

impl LocalizedText {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut text = Self::default();
        for (k, v) in entries {
            text.insert(k.into(), v.into());
        }
        text
    }

    // 重复的语言代码以后出现的值为准，位置不变
    fn insert(&mut self, locale: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == locale) {
            Some(entry) => entry.1 = value,
            None => self.0.push((locale, value)),
        }
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == locale)
            .map(|(_, v)| v.as_str())
    }

    /// 优先英文，其次按上游顺序第一个非空的其他语言
    pub fn resolve(&self) -> Option<&str> {
        self.get("en").filter(|s| !s.is_empty()).or_else(|| {
            self.0
                .iter()
                .map(|(_, v)| v.as_str())
                .find(|s| !s.is_empty())
        })
    }

    pub fn resolve_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.resolve().unwrap_or(placeholder)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct LocalizedTextVisitor;

impl<'de> Visitor<'de> for LocalizedTextVisitor {
    type Value = LocalizedText;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of locale to text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut text = LocalizedText::default();
        while let Some((locale, value)) = access.next_entry::<String, Option<String>>()? {
            if let Some(value) = value {
                text.insert(locale, value);
            }
        }
        Ok(text)
    }

    // 上游在没有内容时偶尔返回空数组而不是空对象
    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        while access.next_element::<IgnoredAny>()?.is_some() {}
        Ok(LocalizedText::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(LocalizedText::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(LocalizedText::default())
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LocalizedTextVisitor)
    }
}

/// 上游 `/manga` 列表响应
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MangaListResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub data: Vec<MangaRecord>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
}

/// 上游漫画条目
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MangaRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<MangaRelationship>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub publication_demographic: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub last_volume: Option<String>,
    #[serde(default)]
    pub last_chapter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MangaRelationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttributes {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 上游标签条目
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagRecord {
    pub id: String,
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagAttributes {
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub group: Option<String>,
}

/// 上游 `/manga/tag` 响应
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagListResponse {
    #[serde(default)]
    pub data: Vec<TagRecord>,
}

/// 标签（id + 显示名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaTag {
    pub id: String,
    pub name: String,
}

impl MangaTag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&TagRecord> for MangaTag {
    fn from(tag: &TagRecord) -> Self {
        Self {
            id: tag.id.clone(),
            name: tag.attributes.name.resolve_or(&tag.id).to_string(),
        }
    }
}

/// 展示用的漫画摘要，从上游条目投影而来，只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaSummary {
    pub id: String,
    pub display_title: String,
    pub display_description: String,
    pub status: Option<PublicationStatus>,
    pub demographic: Option<Demographic>,
    pub content_rating: ContentRating,
    pub tags: Vec<MangaTag>,
    pub cover_image_ref: Option<String>,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,
    pub last_chapter: Option<String>,
}

impl MangaSummary {
    /// 指定类型关系的名称列表
    fn relationship_names(record: &MangaRecord, kind: &str) -> Vec<String> {
        record
            .relationships
            .iter()
            .filter(|rel| rel.kind == kind)
            .filter_map(|rel| rel.attributes.as_ref()?.name.clone())
            .collect()
    }
}

impl From<&MangaRecord> for MangaSummary {
    fn from(record: &MangaRecord) -> Self {
        let attrs = &record.attributes;

        let cover_image_ref = record
            .relationships
            .iter()
            .find(|rel| rel.kind == "cover_art")
            .and_then(|rel| rel.attributes.as_ref())
            .and_then(|a| a.file_name.clone());

        // 未知分级按最严格处理
        let content_rating = attrs
            .content_rating
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or(ContentRating::Pornographic);

        Self {
            id: record.id.clone(),
            display_title: attrs.title.resolve_or(TITLE_PLACEHOLDER).to_string(),
            display_description: attrs
                .description
                .resolve_or(DESCRIPTION_PLACEHOLDER)
                .to_string(),
            status: attrs.status.as_deref().and_then(|s| s.parse().ok()),
            demographic: attrs
                .publication_demographic
                .as_deref()
                .and_then(|d| d.parse().ok()),
            content_rating,
            tags: attrs.tags.iter().map(MangaTag::from).collect(),
            cover_image_ref,
            year: attrs.year,
            authors: Self::relationship_names(record, "author"),
            artists: Self::relationship_names(record, "artist"),
            last_chapter: attrs.last_chapter.clone().filter(|c| !c.is_empty()),
        }
    }
}
