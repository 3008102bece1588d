use crate::config::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 預設設定檔位置（目前工作目錄）
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_SETTINGS_FILE))
    }

    /// 讀取設定檔；檔案不存在時使用預設值
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}
