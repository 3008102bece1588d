use super::{ItemStore, MediaItem, select_pending};
use anyhow::{Result, bail};
use std::sync::{Mutex, PoisonError};

/// 記憶體內的媒體庫，供嵌入使用或測試
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: Mutex<Vec<MediaItem>>,
}

impl MemoryItemStore {
    #[must_use]
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<MediaItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn has_preview(&self, item_id: &str) -> bool {
        self.snapshot()
            .iter()
            .any(|i| i.id == item_id && i.has_preview)
    }
}

impl ItemStore for MemoryItemStore {
    fn pending_items(&self) -> Result<Vec<MediaItem>> {
        Ok(select_pending(
            &self.items.lock().unwrap_or_else(PoisonError::into_inner),
        ))
    }

    fn mark_has_preview(&self, item_id: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(item) = items.iter_mut().find(|i| i.id == item_id) else {
            bail!("找不到項目: {item_id}");
        };
        item.has_preview = true;
        Ok(())
    }
}
