use super::error::PreviewError;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 暫存目錄的共用父目錄名稱（位於預覽資料夾下）
pub const SCRATCH_DIR_NAME: &str = "tmp";

/// 單一預覽工作的暫存目錄 `<root>/tmp/<uuid>/`
///
/// 只屬於一個工作；`close` 或 drop 時刪除，`tmp` 清空時一併刪除。
#[derive(Debug)]
pub struct ScratchWorkspace {
    path: PathBuf,
    removed: bool,
}

impl ScratchWorkspace {
    pub fn create(root: &Path) -> Result<Self, PreviewError> {
        let path = root
            .join(SCRATCH_DIR_NAME)
            .join(Uuid::new_v4().simple().to_string());

        fs::create_dir_all(&path).map_err(|source| PreviewError::Workspace {
            path: path.clone(),
            source,
        })?;
        debug!("建立暫存目錄: {}", path.display());

        Ok(Self {
            path,
            removed: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// 刪除暫存目錄並回報錯誤
    pub fn close(mut self) -> Result<(), PreviewError> {
        self.removed = true;
        self.remove()
    }

    fn remove(&self) -> Result<(), PreviewError> {
        if self.path.exists() {
            fs::remove_dir_all(&self.path).map_err(|source| PreviewError::Workspace {
                path: self.path.clone(),
                source,
            })?;
        }

        // 其他工作仍在使用時會失敗，忽略即可
        if let Some(parent) = self.path.parent() {
            let _ = fs::remove_dir(parent);
        }

        debug!("已清理暫存目錄: {}", self.path.display());
        Ok(())
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = self.remove() {
            warn!("無法清理暫存目錄: {e}");
        }
    }
}
