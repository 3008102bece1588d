use super::{ItemStore, MediaItem, select_pending};
use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// 以 JSON 檔案（項目陣列）保存的媒體庫
///
/// 寫回時先寫暫存檔再改名，避免中途失敗留下損壞的檔案。
#[derive(Debug)]
pub struct JsonItemStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonItemStore {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn load_all(&self) -> Result<Vec<MediaItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("無法讀取媒體庫: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("無法解析媒體庫: {}", self.path.display()))
    }

    pub fn save_all(&self, items: &[MediaItem]) -> Result<()> {
        let content = serde_json::to_string_pretty(items).context("無法序列化媒體庫")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("無法寫入媒體庫暫存檔: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("無法更新媒體庫: {}", self.path.display()))?;

        Ok(())
    }
}

impl ItemStore for JsonItemStore {
    fn pending_items(&self) -> Result<Vec<MediaItem>> {
        Ok(select_pending(&self.load_all()?))
    }

    fn mark_has_preview(&self, item_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut items = self.load_all()?;
        let Some(item) = items.iter_mut().find(|i| i.id == item_id) else {
            bail!("媒體庫中找不到項目: {item_id}");
        };
        item.has_preview = true;

        self.save_all(&items)?;
        debug!("已標記預覽完成: {item_id}");
        Ok(())
    }
}
