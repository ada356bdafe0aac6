use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use super::error::ApiResult;
use super::response::ApiResponse;
use super::AppState;

/// 原样转发查询参数到上游 `/manga`，返回上游 JSON
pub async fn search_passthrough(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    tracing::debug!("Forwarding catalog query with {} params", params.len());

    let value = state.external_client.source().search_raw(&params).await?;
    Ok(Json(value))
}

/// 标签列表，上游不可用时返回默认标签
pub async fn get_tags(State(state): State<AppState>) -> impl IntoResponse {
    let tags = state.discovery.tags().await;
    ApiResponse::with_placeholder(tags.data, tags.placeholder)
}

/// 单部漫画的统计信息，上游不可用时返回占位统计
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let stats = state.discovery.statistics(&id).await;
    ApiResponse::with_placeholder(stats.data, stats.placeholder)
}
