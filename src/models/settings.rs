use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use super::ai::AIConfig;

pub const ENV_API_KEY: &str = "STOCK_AI_API_KEY";
pub const ENV_BASE_URL: &str = "STOCK_AI_BASE_URL";
pub const ENV_MODEL: &str = "STOCK_AI_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "STOCK_AI_TIMEOUT_SECS";
pub const ENV_CATALOG_PATH: &str = "STOCK_CATALOG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub ai: AIConfig,
    /// 股票列表文件，未设置时使用内置列表
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl AppSettings {
    /// 从环境变量读取配置，未设置的项保持默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            settings.ai.api_key = key;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            settings.ai.base_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            settings.ai.model_name = model;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            match secs.parse::<u64>() {
                Ok(v) if v > 0 => settings.ai.timeout_secs = v,
                _ => log::warn!("忽略无效的 {}: {}", ENV_TIMEOUT_SECS, secs),
            }
        }
        settings.catalog_path = get(ENV_CATALOG_PATH).map(PathBuf::from);
        settings
    }
}
