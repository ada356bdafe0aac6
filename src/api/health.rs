use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use super::response::success;
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let cache_stats = state.external_client.get_cache_stats();

    success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.sessions.entry_count(),
        "catalog_cache": cache_stats,
    }))
}

/// 清理过期缓存
pub async fn cleanup_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.external_client.cleanup_cache().await;

    success(json!({
        "message": "Cache cleanup completed",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// 清空所有缓存
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.external_client.clear_cache().await;

    success(json!({
        "message": "All caches cleared",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
