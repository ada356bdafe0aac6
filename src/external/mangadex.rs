use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;

use super::{CatalogSource, CoverImage, FetchError};
use crate::models::{MangaListResponse, StatisticsResponse, TagListResponse};

/// MangaDex 兼容目录 API 客户端
#[derive(Clone)]
pub struct MangaDexClient {
    client: Client,
    api_base_url: String,
    uploads_base_url: String,
}

impl MangaDexClient {
    pub const USER_AGENT: &'static str = "manga-discovery-backend/0.1";

    pub fn new(
        api_base_url: &str,
        uploads_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        // 提前校验，避免每次请求时才发现配置错误
        url::Url::parse(api_base_url)?;
        url::Url::parse(uploads_base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(Self::USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            uploads_base_url: uploads_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 发送 GET 请求并解析 JSON，不重试
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Catalog request to {} failed: {}", path, e);
                FetchError::from(e)
            })?;

        if !response.status().is_success() {
            tracing::error!("Catalog API error on {}: {}", path, response.status());
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }

    /// 构建封面图片地址
    pub fn build_cover_url(&self, manga_id: &str, file_name: &str, size: CoverSize) -> String {
        let base = format!(
            "{}/covers/{}/{}",
            self.uploads_base_url,
            urlencoding::encode(manga_id),
            urlencoding::encode(file_name)
        );

        match size.suffix() {
            Some(suffix) => format!("{}.{}.jpg", base, suffix),
            None => base,
        }
    }
}

#[async_trait]
impl CatalogSource for MangaDexClient {
    async fn search_manga(&self, params: &[(String, String)]) -> Result<MangaListResponse, FetchError> {
        self.get_json("/manga", params).await
    }

    async fn search_raw(&self, params: &[(String, String)]) -> Result<serde_json::Value, FetchError> {
        self.get_json("/manga", params).await
    }

    async fn list_tags(&self) -> Result<TagListResponse, FetchError> {
        self.get_json("/manga/tag", &[]).await
    }

    async fn statistics(&self, manga_id: &str) -> Result<StatisticsResponse, FetchError> {
        let path = format!("/statistics/manga/{}", urlencoding::encode(manga_id));
        self.get_json(&path, &[]).await
    }

    async fn cover_image(
        &self,
        manga_id: &str,
        file_name: &str,
        size: CoverSize,
    ) -> Result<CoverImage, FetchError> {
        let url = self.build_cover_url(manga_id, file_name, size);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to fetch cover {}: {}", url, e);
            FetchError::from(e)
        })?;

        if !response.status().is_success() {
            tracing::error!("Cover fetch failed with status: {}", response.status());
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response.bytes().await?;

        Ok(CoverImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// 封面尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    #[default]
    Thumb256,
    Thumb512,
    Original,
}

impl CoverSize {
    fn suffix(&self) -> Option<&'static str> {
        match self {
            CoverSize::Thumb256 => Some("256"),
            CoverSize::Thumb512 => Some("512"),
            CoverSize::Original => None,
        }
    }
}

impl FromStr for CoverSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "256" => Ok(CoverSize::Thumb256),
            "512" => Ok(CoverSize::Thumb512),
            "original" => Ok(CoverSize::Original),
            _ => Err(format!("Invalid cover size: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MangaDexClient {
        MangaDexClient::new(
            "https://api.example.org/",
            "https://uploads.example.org",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_build_cover_url_thumbnail() {
        let url = client().build_cover_url("m1", "cover.png", CoverSize::Thumb512);
        assert_eq!(url, "https://uploads.example.org/covers/m1/cover.png.512.jpg");
    }

    #[test]
    fn test_build_cover_url_original() {
        let url = client().build_cover_url("m1", "cover.png", CoverSize::Original);
        assert_eq!(url, "https://uploads.example.org/covers/m1/cover.png");
    }

    #[test]
    fn test_build_cover_url_encodes_segments() {
        let url = client().build_cover_url("m1", "../secret", CoverSize::Original);
        assert_eq!(url, "https://uploads.example.org/covers/m1/..%2Fsecret");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = MangaDexClient::new("not a url", "https://x.org", Duration::from_secs(1));
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }

    #[test]
    fn test_cover_size_from_str() {
        assert_eq!("256".parse::<CoverSize>(), Ok(CoverSize::Thumb256));
        assert_eq!("original".parse::<CoverSize>(), Ok(CoverSize::Original));
        assert!("1024".parse::<CoverSize>().is_err());
    }
}
