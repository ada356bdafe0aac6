// 偏好设置存储 - 管理成人内容开关的读写
//
// 开关是进程内唯一的共享可变状态：
// - 从 JSON 文件加载，文件或字段缺失时视为关闭
// - 文件损坏时备份旧文件并使用默认值
// - 每次修改立即写回文件，后写覆盖先写

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::services::error::PreferenceError;

/// 持久化的偏好设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "adult-content-enabled", default)]
    pub adult_content_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// 偏好设置存储
///
/// 使用 Arc<RwLock> 在所有请求之间共享
pub struct PreferenceStore {
    path: PathBuf,
    preferences: Arc<RwLock<Preferences>>,
}

impl PreferenceStore {
    /// 默认偏好文件路径
    pub const DEFAULT_PATH: &'static str = "preferences.json";

    /// 从文件加载偏好设置
    ///
    /// - 文件不存在：使用默认值，不创建文件
    /// - 文件损坏：备份为 `.json.backup` 后使用默认值
    pub async fn load(path: Option<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH));

        let preferences = if path.exists() {
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<Preferences>(&content) {
                    Ok(prefs) => {
                        tracing::info!("Loaded preferences from {:?}", path);
                        prefs
                    }
                    Err(e) => {
                        tracing::warn!("Preference file is corrupt, using defaults: {}", e);
                        Self::backup_corrupted(&path).await;
                        Preferences::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read preference file, using defaults: {}", e);
                    Preferences::default()
                }
            }
        } else {
            tracing::info!("Preference file {:?} not found, adult content disabled", path);
            Preferences::default()
        };

        Ok(Self {
            path,
            preferences: Arc::new(RwLock::new(preferences)),
        })
    }

    /// 使用给定初始值构建，不读取文件
    pub fn in_memory(path: PathBuf, preferences: Preferences) -> Self {
        Self {
            path,
            preferences: Arc::new(RwLock::new(preferences)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写回文件
    pub async fn save(&self) -> Result<(), PreferenceError> {
        let prefs = self.preferences.read().await.clone();
        self.write_file(&prefs).await
    }

    async fn write_file(&self, prefs: &Preferences) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(prefs)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.path, json).await?;

        tracing::debug!("Saved preferences to {:?}", self.path);
        Ok(())
    }

    pub async fn is_adult_content_enabled(&self) -> bool {
        self.preferences.read().await.adult_content_enabled
    }

    pub async fn get(&self) -> Preferences {
        self.preferences.read().await.clone()
    }

    /// 设置成人内容开关并立即持久化
    ///
    /// 先写文件，写入成功后才更新内存中的值；写入失败时开关保持原值。
    pub async fn set_adult_content_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        let mut current = self.preferences.write().await;

        let mut updated = current.clone();
        updated.adult_content_enabled = enabled;
        updated.updated_at = Some(Utc::now());

        if let Err(e) = self.write_file(&updated).await {
            tracing::error!("Failed to persist adult content preference: {}", e);
            return Err(e);
        }

        *current = updated;
        tracing::info!("Adult content preference set to {}", enabled);
        Ok(())
    }

    pub async fn enable_adult_content(&self) -> Result<(), PreferenceError> {
        self.set_adult_content_enabled(true).await
    }

    pub async fn disable_adult_content(&self) -> Result<(), PreferenceError> {
        self.set_adult_content_enabled(false).await
    }

    /// 备份损坏的偏好文件，失败不影响主流程
    async fn backup_corrupted(path: &Path) {
        let backup_path = path.with_extension("json.backup");

        match fs::rename(path, &backup_path).await {
            Ok(_) => tracing::info!("Backed up corrupt preference file to {:?}", backup_path),
            Err(e) => tracing::warn!("Failed to back up preference file: {}", e),
        }
    }
}
