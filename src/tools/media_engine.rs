use crate::config::FfmpegSettings;
use crate::tools::{
    ConcatManifest, ProcessRunner, SnippetRequest, concat_segments, extract_snippet,
    probe_duration,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 影片探測、片段擷取與合併
///
/// 預覽流程只透過這個介面接觸外部程序，測試可替換為假實作。
pub trait MediaEngine: Send + Sync {
    /// 第一條視訊串流的長度（秒）
    fn probe_duration(&self, input: &Path) -> Result<f64>;

    fn extract_snippet(&self, request: &SnippetRequest) -> Result<()>;

    /// 依清單順序合併片段到 `output`
    fn concat(&self, manifest: &ConcatManifest, output: &Path) -> Result<()>;
}

/// 以 ffmpeg / ffprobe 子程序實作的 [`MediaEngine`]
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    runner: ProcessRunner,
}

impl FfmpegEngine {
    #[must_use]
    pub fn new(settings: &FfmpegSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            ffmpeg_path: settings.ffmpeg_path.clone(),
            ffprobe_path: settings.ffprobe_path.clone(),
            runner: ProcessRunner::new(settings.process_timeout(), shutdown_signal),
        }
    }
}

impl MediaEngine for FfmpegEngine {
    fn probe_duration(&self, input: &Path) -> Result<f64> {
        probe_duration(&self.runner, &self.ffprobe_path, input)
    }

    fn extract_snippet(&self, request: &SnippetRequest) -> Result<()> {
        extract_snippet(&self.runner, &self.ffmpeg_path, request)
    }

    fn concat(&self, manifest: &ConcatManifest, output: &Path) -> Result<()> {
        concat_segments(&self.runner, &self.ffmpeg_path, manifest, output)
    }
}
