// HTTP 路由集成测试
//
// 使用内存中的目录服务驱动完整路由

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use manga_discovery_backend::api::{self, AppState};
use manga_discovery_backend::external::{
    CatalogSource, CoverImage, CoverSize, ExternalApiClient, FetchError,
};
use manga_discovery_backend::models::{MangaListResponse, StatisticsResponse, TagListResponse};
use manga_discovery_backend::services::PreferenceStore;

/// 条目 0 为敏感内容，其余为普通内容
struct FakeCatalog {
    total: u64,
    down: AtomicBool,
    searches: AtomicUsize,
}

impl FakeCatalog {
    fn new(total: u64) -> Self {
        Self {
            total,
            down: AtomicBool::new(false),
            searches: AtomicUsize::new(0),
        }
    }

    fn check(&self) -> Result<(), FetchError> {
        if self.down.load(Ordering::SeqCst) {
            Err(FetchError::Status(503))
        } else {
            Ok(())
        }
    }

    fn page(&self, params: &[(String, String)]) -> Value {
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.parse::<u64>().ok())
        };
        let limit = get("limit").unwrap_or(10);
        let offset = get("offset").unwrap_or(0);

        let data: Vec<Value> = (offset..(offset + limit).min(self.total))
            .map(|n| {
                let rating = if n == 0 { "pornographic" } else { "safe" };
                json!({
                    "id": format!("m{}", n),
                    "type": "manga",
                    "attributes": {
                        "title": { "ja": format!("Title {}", n) },
                        "description": { "en": "" },
                        "contentRating": rating,
                        "tags": []
                    },
                    "relationships": [
                        { "id": "c1", "type": "cover_art", "attributes": { "fileName": "cover.jpg" } }
                    ]
                })
            })
            .collect();

        json!({ "result": "ok", "data": data, "limit": limit, "offset": offset, "total": self.total })
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search_manga(&self, params: &[(String, String)]) -> Result<MangaListResponse, FetchError> {
        self.check()?;
        self.searches.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(self.page(params)).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn search_raw(&self, params: &[(String, String)]) -> Result<Value, FetchError> {
        self.check()?;
        Ok(json!({ "echo": params }))
    }

    async fn list_tags(&self) -> Result<TagListResponse, FetchError> {
        self.check()?;
        serde_json::from_value(json!({
            "data": [{ "id": "t1", "attributes": { "name": { "en": "Action" } } }]
        }))
        .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn statistics(&self, manga_id: &str) -> Result<StatisticsResponse, FetchError> {
        self.check()?;
        serde_json::from_value(json!({
            "result": "ok",
            "statistics": { (manga_id): { "rating": { "average": 9.1, "bayesian": 8.9 }, "follows": 7 } }
        }))
        .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn cover_image(
        &self,
        _manga_id: &str,
        file_name: &str,
        size: CoverSize,
    ) -> Result<CoverImage, FetchError> {
        self.check()?;
        if file_name == "missing.jpg" {
            return Err(FetchError::Status(404));
        }
        Ok(CoverImage {
            content_type: "image/jpeg".to_string(),
            bytes: format!("{}:{:?}", file_name, size).into_bytes(),
        })
    }
}

struct TestApp {
    router: Router,
    catalog: Arc<FakeCatalog>,
    _temp_dir: TempDir,
}

async fn app(total: u64) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let preferences = PreferenceStore::load(Some(temp_dir.path().join("preferences.json")))
        .await
        .unwrap();

    let catalog = Arc::new(FakeCatalog::new(total));
    let state = AppState::new(
        ExternalApiClient::new(catalog.clone()),
        Arc::new(preferences),
        10,
        Duration::from_secs(60),
    );

    TestApp {
        router: api::router(state),
        catalog,
        _temp_dir: temp_dir,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app(5).await;
    let (status, body) = send(&app.router, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_search_session_flow() {
    let app = app(25).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/search",
        Some(json!({ "title": "hero", "sort_by": "rating", "sort_order": "asc" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 10);
    assert_eq!(data["total"], 25);
    assert_eq!(data["has_more"], true);
    assert_eq!(data["items"][0]["display_title"], "Title 0");
    assert_eq!(data["items"][0]["display_description"], "Description not available");

    let session_id = data["session_id"].as_str().unwrap().to_string();

    let (_, body) = send(&app.router, Method::POST, &format!("/api/search/{}/more", session_id), None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 20);
    assert_eq!(body["data"]["current_page"], 2);

    let (_, body) = send(&app.router, Method::POST, &format!("/api/search/{}/more", session_id), None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 25);
    assert_eq!(body["data"]["has_more"], false);

    let searches = app.catalog.searches.load(Ordering::SeqCst);
    let (status, body) = send(&app.router, Method::POST, &format!("/api/search/{}/more", session_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 25);
    assert_eq!(app.catalog.searches.load(Ordering::SeqCst), searches);

    let (status, body) = send(&app.router, Method::GET, &format!("/api/search/{}", session_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["current_page"], 3);
}

#[tokio::test]
async fn test_search_rejects_invalid_request() {
    let app = app(5).await;

    let (status, body) = send(&app.router, Method::POST, "/api/search", Some(json!({ "page": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "bad_request");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/search",
        Some(json!({ "included_tags": ["a"], "excluded_tags": ["a"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_upstream_failure_is_reported() {
    let app = app(5).await;
    app.catalog.down.store(true, Ordering::SeqCst);

    let (status, body) = send(&app.router, Method::POST, "/api/search", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], "external_service_error");
}

#[tokio::test]
async fn test_unknown_session() {
    let app = app(5).await;
    let uri = format!("/api/search/{}/more", uuid::Uuid::new_v4());

    let (status, _) = send(&app.router, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sensitive_item_reveal() {
    let app = app(3).await;

    let (_, body) = send(&app.router, Method::POST, "/api/search", Some(json!({}))).await;
    let data = &body["data"];
    assert_eq!(data["items"][0]["sensitive"], true);
    assert_eq!(data["items"][0]["visibility"], "obscured");
    assert_eq!(data["items"][1]["visibility"], "plain");
    assert_eq!(data["adult_content_enabled"], false);

    let session_id = data["session_id"].as_str().unwrap().to_string();
    let reveal_uri = format!("/api/search/{}/reveal/m0", session_id);

    let (status, body) = send(&app.router, Method::POST, &reveal_uri, Some(json!({ "action": "decline" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["visibility"], "obscured");

    let (_, body) = send(
        &app.router,
        Method::POST,
        &reveal_uri,
        Some(json!({ "action": "confirm", "remember": false })),
    )
    .await;
    assert_eq!(body["data"]["visibility"], "plain");
    assert_eq!(body["data"]["adult_content_enabled"], false);

    let (_, body) = send(&app.router, Method::GET, "/api/preferences/adult-content", None).await;
    assert_eq!(body["data"]["enabled"], false);

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/api/search/{}/reveal/unknown", session_id),
        Some(json!({ "action": "decline" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_adult_content_preference() {
    let app = app(3).await;

    let (status, body) = send(
        &app.router,
        Method::PUT,
        "/api/preferences/adult-content",
        Some(json!({ "enabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);

    let (_, body) = send(&app.router, Method::POST, "/api/search", Some(json!({}))).await;
    assert_eq!(body["data"]["items"][0]["visibility"], "plain");
    assert_eq!(body["data"]["adult_content_enabled"], true);
}

#[tokio::test]
async fn test_tags_and_statistics_fallback() {
    let app = app(3).await;

    let (_, body) = send(&app.router, Method::GET, "/api/manga/statistics/m1", None).await;
    assert_eq!(body["data"]["follows"], 7);
    assert!(body.get("placeholder").is_none());

    app.catalog.down.store(true, Ordering::SeqCst);

    let (status, body) = send(&app.router, Method::GET, "/api/manga/tags", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["placeholder"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let (_, body) = send(&app.router, Method::GET, "/api/manga/statistics/m2", None).await;
    assert_eq!(body["placeholder"], true);
    assert_eq!(body["data"]["follows"], 12500);
}

#[tokio::test]
async fn test_manga_passthrough() {
    let app = app(3).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/manga?title=abc&includes%5B%5D=cover_art&includes%5B%5D=author",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["echo"],
        json!([["title", "abc"], ["includes[]", "cover_art"], ["includes[]", "author"]])
    );
}

#[tokio::test]
async fn test_cover_proxy() {
    let app = app(3).await;

    let request = Request::builder()
        .uri("/api/cover/m1/cover.jpg?size=512")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000"
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"cover.jpg:Thumb512");

    let (status, _) = send(&app.router, Method::GET, "/api/cover/m1/cover.jpg?size=1024", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, Method::GET, "/api/cover/m1/missing.jpg", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_discover_endpoints() {
    let app = app(30).await;

    let (status, body) = send(&app.router, Method::GET, "/api/discover/home?limit=12", None).await;
    assert_eq!(status, StatusCode::OK);
    let sections = body["data"].as_array().unwrap();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0]["key"], "popular");
    assert_eq!(sections[0]["items"].as_array().unwrap().len(), 12);

    let (_, body) = send(&app.router, Method::GET, "/api/discover/categories", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/discover/categories/seinen?sort=recent&page=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sort"], "recent");
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);

    let (status, _) = send(&app.router, Method::GET, "/api/discover/categories/kodomo", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::GET, "/api/discover/categories/josei?sort=newest", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discover_home_falls_back_when_upstream_down() {
    let app = app(30).await;
    app.catalog.down.store(true, Ordering::SeqCst);

    let (status, body) = send(&app.router, Method::GET, "/api/discover/home", None).await;
    assert_eq!(status, StatusCode::OK);
    for section in body["data"].as_array().unwrap() {
        assert_eq!(section["placeholder"], true);
        assert_eq!(section["items"].as_array().unwrap().len(), 20);
    }
}

#[tokio::test]
async fn test_clear_cache_drops_cached_tags() {
    let app = app(5).await;

    let (status, _) = send(&app.router, Method::GET, "/api/manga/tags", None).await;
    assert_eq!(status, StatusCode::OK);

    // 上游不可用时仍命中缓存
    app.catalog.down.store(true, Ordering::SeqCst);
    let (_, body) = send(&app.router, Method::GET, "/api/manga/tags", None).await;
    assert!(body.get("placeholder").is_none());
    assert_eq!(body["data"][0]["name"], "Action");

    let (status, _) = send(&app.router, Method::POST, "/api/cache/cleanup", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::POST, "/api/cache/clear", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app.router, Method::GET, "/api/manga/tags", None).await;
    assert_eq!(body["placeholder"], true);

    let (_, body) = send(&app.router, Method::GET, "/api/health", None).await;
    assert_eq!(body["data"]["catalog_cache"]["tags_cache_size"], 0);
}
