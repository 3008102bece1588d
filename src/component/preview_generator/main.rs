use super::renderer::PreviewRenderer;
use crate::config::{Config, PreviewSettings};
use crate::library::{ItemStore, MediaItem};
use crate::tools::{LockService, MediaEngine, try_lock};
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 預覽批次使用的鎖名稱
pub const PREVIEW_LOCK_NAME: &str = "previews";

/// 批次處理結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total_items: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// 收到中斷訊號而提前結束
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 已有其他批次在執行，本次未做任何事
    LockBusy,
    Completed(BatchReport),
}

/// 預覽批次排程
///
/// 取得 `previews` 鎖後，依發行時間由新到舊處理所有可用且缺少預覽的項目。
/// 單一項目失敗只記錄，不影響其他項目；失敗的項目保持未標記，下次批次會再處理。
pub struct PreviewGenerator {
    settings: PreviewSettings,
    preview_dir: PathBuf,
    output_extension: String,
    store: Arc<dyn ItemStore>,
    engine: Arc<dyn MediaEngine>,
    locks: Arc<dyn LockService>,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewGenerator {
    pub fn new(
        config: &Config,
        store: Arc<dyn ItemStore>,
        engine: Arc<dyn MediaEngine>,
        locks: Arc<dyn LockService>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings: config.preview.clone(),
            preview_dir: config.preview_dir.clone(),
            output_extension: config.output_extension.clone(),
            store,
            engine,
            locks,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn preview_path(&self, item_id: &str) -> PathBuf {
        self.preview_dir
            .join(format!("{item_id}.{}", self.output_extension))
    }

    pub fn run_batch(&self) -> Result<BatchOutcome> {
        let Some(_guard) = try_lock(self.locks.as_ref(), PREVIEW_LOCK_NAME)? else {
            info!("預覽批次已在執行中，略過本次");
            return Ok(BatchOutcome::LockBusy);
        };

        let items = self
            .store
            .pending_items()
            .context("無法查詢需要預覽的項目")?;

        info!("開始產生預覽，共 {} 個項目", items.len());
        let report = self.process_items(&items);
        info!(
            "預覽產生完成 - 成功: {}, 跳過: {}, 失敗: {}",
            report.successful, report.skipped, report.failed
        );

        Ok(BatchOutcome::Completed(report))
    }

    fn process_items(&self, items: &[MediaItem]) -> BatchReport {
        let renderer = PreviewRenderer::new(
            self.engine.as_ref(),
            &self.preview_dir,
            Arc::clone(&self.shutdown_signal),
        );
        let mut report = BatchReport {
            total_items: items.len(),
            ..BatchReport::default()
        };

        for item in items {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                report.interrupted = true;
                break;
            }

            if !is_safe_file_stem(&item.id) {
                warn!("{:?}: 項目 ID 不能作為檔名，跳過", item.id);
                report.skipped += 1;
                continue;
            }

            let Some(source) = item.first_existing_file() else {
                info!("{}: 沒有可用的影片檔案，跳過", item.id);
                report.skipped += 1;
                continue;
            };

            if self.render_item(&renderer, item, source.path()) {
                report.successful += 1;
            } else {
                report.failed += 1;
            }
        }

        report
    }

    fn render_item(&self, renderer: &PreviewRenderer<'_>, item: &MediaItem, input: &Path) -> bool {
        info!("產生預覽 {}", item.id);
        let output = self.preview_path(&item.id);

        if let Err(e) = renderer.render(input, &output, &self.settings) {
            warn!("{}: 預覽產生失敗: {e}", item.id);
            return false;
        }

        match self.store.mark_has_preview(&item.id) {
            Ok(()) => true,
            Err(e) => {
                error!("{}: 無法更新預覽狀態: {e:#}", item.id);
                false
            }
        }
    }
}

/// 項目 ID 會直接成為 `preview_dir` 下的檔名，不可跳出該目錄
fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && !id.contains("..")
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryItemStore;
    use crate::tools::{ConcatManifest, MemoryLockService, SnippetRequest};

    struct NoopEngine;

    impl MediaEngine for NoopEngine {
        fn probe_duration(&self, _input: &Path) -> Result<f64> {
            anyhow::bail!("unused")
        }

        fn extract_snippet(&self, _request: &SnippetRequest) -> Result<()> {
            anyhow::bail!("unused")
        }

        fn concat(&self, _manifest: &ConcatManifest, _output: &Path) -> Result<()> {
            anyhow::bail!("unused")
        }
    }

    fn generator(config: &Config) -> PreviewGenerator {
        PreviewGenerator::new(
            config,
            Arc::new(MemoryItemStore::default()),
            Arc::new(NoopEngine),
            Arc::new(MemoryLockService::new()),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_preview_path() {
        let config = Config {
            preview_dir: PathBuf::from("/data/previews"),
            ..Config::default()
        };
        assert_eq!(
            generator(&config).preview_path("scene-42"),
            PathBuf::from("/data/previews/scene-42.mp4")
        );
    }

    #[test]
    fn test_item_id_must_stay_inside_preview_dir() {
        for id in ["scene-42", "abc.def", "影片_1"] {
            assert!(is_safe_file_stem(id), "{id} 應該可用");
        }
        for id in ["", ".", "..", "../x", "a/b", "a\\b", "x..y", "/etc/passwd"] {
            assert!(!is_safe_file_stem(id), "{id} 應該被拒絕");
        }
    }

    #[test]
    fn test_empty_library_completes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            preview_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert_eq!(
            generator(&config).run_batch().unwrap(),
            BatchOutcome::Completed(BatchReport::default())
        );
    }
}
