use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::response::success;
use super::AppState;
use crate::models::{FilterSpec, SearchRequest};
use crate::services::{RevealResponse, SearchSession, Visibility};

#[derive(Debug, Serialize)]
pub struct RevealResult {
    pub manga_id: String,
    pub visibility: Visibility,
    pub adult_content_enabled: bool,
}

async fn find_session(state: &AppState, session_id: Uuid) -> ApiResult<Arc<SearchSession>> {
    state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Search session {} not found", session_id)))
}

/// 开始新的搜索会话并加载第一页
pub async fn create_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<impl IntoResponse> {
    let spec = FilterSpec::try_from(request)?;

    let session_id = Uuid::new_v4();
    let session = Arc::new(SearchSession::new(
        state.external_client.source(),
        state.page_size,
    ));

    session.submit(spec).await?;
    state.sessions.insert(session_id, Arc::clone(&session)).await;
    tracing::info!("Created search session {}", session_id);

    Ok(success(session.view(session_id, &state.gate).await))
}

/// 会话当前累积的结果
pub async fn get_search(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = find_session(&state, session_id).await?;
    Ok(success(session.view(session_id, &state.gate).await))
}

/// 加载下一页；已无更多结果时直接返回当前状态
pub async fn load_more(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let session = find_session(&state, session_id).await?;

    match session.load_more().await? {
        Some(page) => tracing::debug!("Session {} loaded page {}", session_id, page.page_index),
        None => tracing::debug!("Session {} has nothing more to load", session_id),
    }

    Ok(success(session.view(session_id, &state.gate).await))
}

/// 处理条目的揭示确认
pub async fn reveal_item(
    State(state): State<AppState>,
    Path((session_id, manga_id)): Path<(Uuid, String)>,
    Json(response): Json<RevealResponse>,
) -> ApiResult<impl IntoResponse> {
    let session = find_session(&state, session_id).await?;

    let visibility = session
        .reveal(&state.gate, &manga_id, response)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Manga {} is not part of this search", manga_id))
        })?;

    Ok(success(RevealResult {
        manga_id,
        visibility,
        adult_content_enabled: state.gate.preferences().is_adult_content_enabled().await,
    }))
}
