use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::response::{success, ApiResponse};
use super::AppState;
use crate::models::Demographic;
use crate::services::CategorySort;

/// 首页每个板块默认条目数
const DEFAULT_HOME_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct HomeParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    pub sort: Option<String>,
    pub page: Option<u32>,
}

/// 首页：热门、最近更新、高分
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeParams>,
) -> ApiResult<impl IntoResponse> {
    let sections = state
        .discovery
        .home_sections(params.limit.unwrap_or(DEFAULT_HOME_LIMIT))
        .await?;

    Ok(success(sections))
}

/// 四个读者群的预览
pub async fn categories(State(state): State<AppState>) -> impl IntoResponse {
    success(state.discovery.category_previews().await)
}

/// 单个读者群的分页列表
pub async fn category_listing(
    State(state): State<AppState>,
    Path(demographic): Path<String>,
    Query(params): Query<CategoryParams>,
) -> ApiResult<impl IntoResponse> {
    let demographic: Demographic = demographic.parse().map_err(ApiError::NotFound)?;
    let sort = match params.sort.as_deref() {
        Some(sort) => sort.parse::<CategorySort>().map_err(ApiError::BadRequest)?,
        None => CategorySort::default(),
    };

    let listing = state
        .discovery
        .category_listing(demographic, sort, params.page.unwrap_or(1))
        .await?;

    let placeholder = listing.placeholder;
    Ok(ApiResponse::with_placeholder(listing, placeholder))
}
