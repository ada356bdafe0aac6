pub mod discover;
pub mod error;
pub mod health;
pub mod manga;
pub mod preferences;
pub mod proxy;
pub mod response;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::external::ExternalApiClient;
use crate::services::{ContentGate, DiscoveryService, PreferenceStore, SearchSession};

/// 同时保留的搜索会话上限
const MAX_SESSIONS: u64 = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub external_client: ExternalApiClient,
    pub discovery: DiscoveryService,
    pub gate: ContentGate,
    pub sessions: Cache<Uuid, Arc<SearchSession>>,
    pub page_size: u32,
}

impl AppState {
    pub fn new(
        external_client: ExternalApiClient,
        preferences: Arc<PreferenceStore>,
        page_size: u32,
        session_idle: Duration,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(session_idle)
            .build();

        Self {
            discovery: DiscoveryService::new(external_client.clone(), page_size),
            external_client,
            gate: ContentGate::new(preferences),
            sessions,
            page_size,
        }
    }
}

/// 构建全部路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Manga Discovery Backend API v0.1" }))
        // Health and cache
        .route("/api/health", get(health::health_check))
        .route("/api/cache/cleanup", post(health::cleanup_cache))
        .route("/api/cache/clear", post(health::clear_cache))
        // Catalog pass-through
        .route("/api/manga", get(manga::search_passthrough))
        .route("/api/manga/tags", get(manga::get_tags))
        .route("/api/manga/statistics/:id", get(manga::get_statistics))
        // Cover proxy
        .route("/api/cover/:manga_id/:file_name", get(proxy::proxy_cover))
        // Search sessions
        .route("/api/search", post(search::create_search))
        .route("/api/search/:session_id", get(search::get_search))
        .route("/api/search/:session_id/more", post(search::load_more))
        .route(
            "/api/search/:session_id/reveal/:manga_id",
            post(search::reveal_item),
        )
        // Discovery
        .route("/api/discover/home", get(discover::home))
        .route("/api/discover/categories", get(discover::categories))
        .route(
            "/api/discover/categories/:demographic",
            get(discover::category_listing),
        )
        // Preferences
        .route(
            "/api/preferences/adult-content",
            get(preferences::get_adult_content).put(preferences::set_adult_content),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
