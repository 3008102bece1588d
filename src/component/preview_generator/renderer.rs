use super::error::PreviewError;
use super::scratch_workspace::ScratchWorkspace;
use super::segment_planner::{Segment, plan_segments};
use crate::config::PreviewSettings;
use crate::tools::{ConcatManifest, MediaEngine, SnippetRequest};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 合併清單檔名
pub const MANIFEST_FILE_NAME: &str = "concat.txt";

/// 單一項目的預覽工作，處理完即丟棄
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub duration: f64,
    pub settings: PreviewSettings,
    pub segments: Vec<Segment>,
}

/// 將一部影片轉為一個預覽檔
///
/// 流程：
/// 1. 建立暫存目錄
/// 2. 探測影片長度
/// 3. 規劃片段
/// 4. 依序擷取片段到 `{ordinal}.{ext}`
/// 5. 寫入合併清單
/// 6. 合併到暫存輸出檔，再改名為最終檔名
///
/// 任一步驟失敗就中止，不重試，也不會在最終路徑留下不完整的檔案。
pub struct PreviewRenderer<'a> {
    engine: &'a dyn MediaEngine,
    preview_dir: PathBuf,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> PreviewRenderer<'a> {
    pub fn new(
        engine: &'a dyn MediaEngine,
        preview_dir: &Path,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            preview_dir: preview_dir.to_path_buf(),
            shutdown_signal,
        }
    }

    pub fn render(
        &self,
        input: &Path,
        output: &Path,
        settings: &PreviewSettings,
    ) -> Result<PreviewJob, PreviewError> {
        let workspace = ScratchWorkspace::create(&self.preview_dir)?;

        let duration = self
            .engine
            .probe_duration(input)
            .map_err(|e| {
                self.stage_error(PreviewError::Probe {
                    path: input.to_path_buf(),
                    reason: format!("{e:#}"),
                })
            })?;

        let segments = plan_segments(duration, settings)?;
        debug!(
            "{}: 長度 {duration:.1}s，規劃 {} 個片段",
            input.display(),
            segments.len()
        );

        let extension = output_extension(output);
        let mut segment_files = Vec::with_capacity(segments.len());

        for segment in &segments {
            self.check_shutdown()?;

            let request = SnippetRequest {
                input: input.to_path_buf(),
                output: workspace.join(format!("{}.{extension}", segment.ordinal)),
                start: segment.start,
                length: segment.length,
                resolution: settings.resolution,
            };

            self.engine
                .extract_snippet(&request)
                .map_err(|e| self.stage_error(PreviewError::Extract {
                    ordinal: segment.ordinal,
                    reason: format!("{e:#}"),
                }))?;

            segment_files.push(request.output);
        }

        self.check_shutdown()?;

        let manifest_path = workspace.join(MANIFEST_FILE_NAME);
        let manifest = ConcatManifest::write(&manifest_path, segment_files)
            .map_err(|e| PreviewError::Concat(format!("{e:#}")))?;

        let staging = StagingFile::new(output);
        self.engine
            .concat(&manifest, staging.path())
            .map_err(|e| self.stage_error(PreviewError::Concat(format!("{e:#}"))))?;

        workspace.close()?;
        staging.publish(output)?;

        info!("預覽已建立: {}", output.display());

        Ok(PreviewJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            duration,
            settings: settings.clone(),
            segments,
        })
    }

    fn check_shutdown(&self) -> Result<(), PreviewError> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(PreviewError::Cancelled);
        }
        Ok(())
    }

    /// 外部程序因中斷訊號被終止時，回報為取消而非階段失敗
    fn stage_error(&self, error: PreviewError) -> PreviewError {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            PreviewError::Cancelled
        } else {
            error
        }
    }
}

fn output_extension(output: &Path) -> String {
    output
        .extension()
        .map_or_else(|| "mp4".to_string(), |e| e.to_string_lossy().to_string())
}

/// 合併輸出先寫到同資料夾的 `.<stem>.partial.<ext>`，成功後才改名
struct StagingFile {
    path: PathBuf,
    published: bool,
}

impl StagingFile {
    fn new(output: &Path) -> Self {
        let stem = output
            .file_stem()
            .map_or_else(|| "preview".to_string(), |s| s.to_string_lossy().to_string());
        let file_name = format!(".{stem}.partial.{}", output_extension(output));
        let path = output
            .parent()
            .unwrap_or(Path::new("."))
            .join(file_name);

        Self {
            path,
            published: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn publish(mut self, output: &Path) -> Result<(), PreviewError> {
        fs::rename(&self.path, output).map_err(|source| PreviewError::Publish {
            path: output.to_path_buf(),
            source,
        })?;
        self.published = true;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.published || !self.path.exists() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("無法刪除未完成的預覽檔 {}: {e}", self.path.display());
        }
    }
}
