use crate::tools::ProcessRunner;
use crate::tools::timecode::{format_length, format_seek_timecode};
use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 單一片段擷取任務
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// 起始時間（秒）
    pub start: f64,
    /// 片段長度（秒）
    pub length: f64,
    /// 輸出正方形邊長
    pub resolution: u32,
}

impl SnippetRequest {
    /// 取畫面右半部，再縮放為 `resolution x resolution`
    #[must_use]
    pub fn video_filter(&self) -> String {
        format!(
            "crop=in_w/2:in_h:in_w/2:in_h,scale={0}:{0}",
            self.resolution
        )
    }

    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format_seek_timecode(self.start),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
            "-vf".to_string(),
            self.video_filter(),
            "-t".to_string(),
            format_length(self.length),
            "-an".to_string(),
            self.output.to_string_lossy().to_string(),
        ]
    }
}

/// 擷取一段無聲片段，失敗不重試
pub fn extract_snippet(
    runner: &ProcessRunner,
    ffmpeg_path: &Path,
    request: &SnippetRequest,
) -> Result<()> {
    if !request.start.is_finite() || request.start < 0.0 {
        bail!("片段起始時間無效: {}", request.start);
    }

    debug!(
        "擷取片段: {} @ {:.2}s +{}s -> {}",
        request.input.display(),
        request.start,
        request.length,
        request.output.display()
    );

    let mut command = Command::new(ffmpeg_path);
    command.args(request.build_args());

    runner
        .run(command)
        .with_context(|| format!("ffmpeg 擷取片段失敗: {}", request.input.display()))?;

    if !request.output.exists() {
        bail!("片段檔案未建立: {}", request.output.display());
    }

    Ok(())
}
