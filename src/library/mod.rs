//! 媒體項目資料
//!
//! 預覽流程只讀取項目，並在成功後寫回 `has_preview`。

mod json_store;
mod memory_store;

pub use json_store::JsonItemStore;
pub use memory_store::MemoryItemStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 候選來源影片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub has_preview: bool,
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
}

impl MediaItem {
    /// 第一個實際存在的候選檔案
    #[must_use]
    pub fn first_existing_file(&self) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.exists())
    }

    #[must_use]
    pub const fn needs_preview(&self) -> bool {
        self.is_available && !self.has_preview
    }
}

/// 媒體項目儲存
pub trait ItemStore: Send + Sync {
    /// 可用且尚無預覽的項目，依發行時間由新到舊
    fn pending_items(&self) -> Result<Vec<MediaItem>>;

    fn mark_has_preview(&self, item_id: &str) -> Result<()>;
}

/// 篩選需要預覽的項目並排序
///
/// 發行時間新的在前，沒有發行時間的排最後；相同時間保持原順序。
#[must_use]
pub fn select_pending(items: &[MediaItem]) -> Vec<MediaItem> {
    let mut pending: Vec<MediaItem> = items
        .iter()
        .filter(|item| item.needs_preview())
        .cloned()
        .collect();
    pending.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, available: bool, has_preview: bool, year: Option<i32>) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            is_available: available,
            has_preview,
            files: Vec::new(),
            release_date: year.map(|y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_select_pending_filters_and_orders() {
        let items = vec![
            item("old", true, false, Some(2019)),
            item("unavailable", false, false, Some(2024)),
            item("done", true, true, Some(2023)),
            item("undated", true, false, None),
            item("new", true, false, Some(2022)),
        ];

        let ids: Vec<String> = select_pending(&items).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_select_pending_is_stable_for_equal_dates() {
        let items = vec![
            item("a", true, false, Some(2020)),
            item("b", true, false, Some(2020)),
        ];
        let ids: Vec<String> = select_pending(&items).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_first_existing_file_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.mp4");
        std::fs::write(&present, b"video").unwrap();

        let mut media = item("x", true, false, None);
        media.files = vec![
            SourceFile::new(dir.path().join("missing.mp4")),
            SourceFile::new(&present),
        ];
        assert_eq!(media.first_existing_file().unwrap().path(), present);

        media.files.truncate(1);
        assert!(media.first_existing_file().is_none());
    }
}
