use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::response::success;
use super::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdultContentPreference {
    pub enabled: bool,
}

pub async fn get_adult_content(State(state): State<AppState>) -> impl IntoResponse {
    let enabled = state.gate.preferences().is_adult_content_enabled().await;
    success(AdultContentPreference { enabled })
}

/// 设置成人内容开关并持久化
pub async fn set_adult_content(
    State(state): State<AppState>,
    Json(body): Json<AdultContentPreference>,
) -> ApiResult<impl IntoResponse> {
    state
        .gate
        .preferences()
        .set_adult_content_enabled(body.enabled)
        .await?;

    Ok(success(AdultContentPreference {
        enabled: body.enabled,
    }))
}
