// 应用配置 - 从环境变量读取，缺失时使用默认值

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("环境变量 {name} 的值无效: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("监听地址无效: {0}")]
    InvalidAddress(String),
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
    pub uploads_base_url: String,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub preferences_path: PathBuf,
    pub session_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_base_url: "https://api.mangadex.org".to_string(),
            uploads_base_url: "https://uploads.mangadex.org".to_string(),
            request_timeout: Duration::from_secs(30),
            page_size: 20,
            preferences_path: PathBuf::from("preferences.json"),
            session_idle: Duration::from_secs(30 * 60),
        }
    }
}

impl AppConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout_secs: u64 = parse_or(&lookup, "MANGA_API_TIMEOUT_SECS", 30)?;
        let idle_minutes: u64 = parse_or(&lookup, "SESSION_IDLE_MINUTES", 30)?;
        let page_size: u32 = parse_or(&lookup, "SEARCH_PAGE_SIZE", defaults.page_size)?;

        if page_size == 0 || page_size > 100 {
            return Err(ConfigError::InvalidValue {
                name: "SEARCH_PAGE_SIZE",
                value: page_size.to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            api_base_url: lookup("MANGA_API_BASE_URL").unwrap_or(defaults.api_base_url),
            uploads_base_url: lookup("MANGA_UPLOADS_BASE_URL")
                .unwrap_or(defaults.uploads_base_url),
            request_timeout: Duration::from_secs(timeout_secs),
            page_size,
            preferences_path: lookup("PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
            session_idle: Duration::from_secs(idle_minutes * 60),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
