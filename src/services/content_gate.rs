// 内容可见性判断
//
// 敏感条目：分级为最严格一档（pornographic）。判断始终按条目逐个进行，
// 不依赖搜索条件里的分级过滤。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{ContentRating, ItemView, MangaSummary};
use crate::services::error::PreferenceError;
use crate::services::preferences::PreferenceStore;

/// 条目的展示方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Plain,
    /// 遮挡显示，并提供揭示入口
    Obscured,
}

pub fn is_sensitive(item: &MangaSummary) -> bool {
    item.content_rating == ContentRating::Pornographic
}

/// 可见性决策
///
/// | 敏感 | 全局开启 | 本地揭示 | 结果     |
/// |------|----------|----------|----------|
/// | 否   | -        | -        | Plain    |
/// | 是   | 是       | -        | Plain    |
/// | 是   | 否       | 是       | Plain    |
/// | 是   | 否       | 否       | Obscured |
pub fn visibility_decision(
    item: &MangaSummary,
    adult_content_enabled: bool,
    locally_revealed: bool,
) -> Visibility {
    if !is_sensitive(item) || adult_content_enabled || locally_revealed {
        Visibility::Plain
    } else {
        Visibility::Obscured
    }
}

/// 本次搜索会话中已揭示的条目
///
/// 每次新的 submit 都会清空
#[derive(Debug, Clone, Default)]
pub struct RevealLedger {
    revealed: HashSet<String>,
}

impl RevealLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reveal(&mut self, manga_id: &str) {
        self.revealed.insert(manga_id.to_string());
    }

    pub fn is_revealed(&self, manga_id: &str) -> bool {
        self.revealed.contains(manga_id)
    }

    pub fn reset(&mut self) {
        self.revealed.clear();
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }
}

/// 用户对揭示确认框的回答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RevealResponse {
    Confirm {
        #[serde(default)]
        remember: bool,
    },
    Decline,
}

/// 结合全局偏好的可见性判断
#[derive(Clone)]
pub struct ContentGate {
    preferences: Arc<PreferenceStore>,
}

impl ContentGate {
    pub fn new(preferences: Arc<PreferenceStore>) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub async fn decide(&self, item: &MangaSummary, ledger: &RevealLedger) -> Visibility {
        let enabled = self.preferences.is_adult_content_enabled().await;
        visibility_decision(item, enabled, ledger.is_revealed(&item.id))
    }

    /// 为一组条目附加可见性
    pub async fn annotate(&self, items: &[MangaSummary], ledger: &RevealLedger) -> Vec<ItemView> {
        let enabled = self.preferences.is_adult_content_enabled().await;

        items
            .iter()
            .map(|item| ItemView {
                manga: item.clone(),
                sensitive: is_sensitive(item),
                visibility: visibility_decision(item, enabled, ledger.is_revealed(&item.id)),
            })
            .collect()
    }

    /// 持久化揭示确认中需要写文件的部分
    ///
    /// 只有“确认并记住”会修改全局开关，其他回应不做任何 I/O。
    pub async fn persist_choice(&self, response: &RevealResponse) -> Result<(), PreferenceError> {
        match response {
            RevealResponse::Confirm { remember: true } => {
                self.preferences.enable_adult_content().await
            }
            _ => Ok(()),
        }
    }

    /// 在本地揭示记录中应用确认结果，返回新的可见性
    pub async fn apply_reveal(
        &self,
        item: &MangaSummary,
        ledger: &mut RevealLedger,
        response: &RevealResponse,
    ) -> Visibility {
        match response {
            RevealResponse::Confirm { remember } => {
                ledger.reveal(&item.id);
                tracing::debug!("Revealed item {} (remember: {})", item.id, remember);
            }
            RevealResponse::Decline => {
                tracing::debug!("Reveal declined for item {}", item.id);
            }
        }

        self.decide(item, ledger).await
    }

    /// 处理揭示确认
    ///
    /// 确认：本地揭示该条目；选择记住时同时持久化全局开关。
    /// 拒绝：不改变任何状态。持久化失败时本地记录也不变。
    pub async fn resolve_reveal(
        &self,
        item: &MangaSummary,
        ledger: &mut RevealLedger,
        response: RevealResponse,
    ) -> Result<Visibility, PreferenceError> {
        self.persist_choice(&response).await?;
        Ok(self.apply_reveal(item, ledger, &response).await)
    }
}
