use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 預覽片段取樣參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// 每個取樣區間的起始偏移（秒）
    pub start_time: u32,
    /// 每個片段長度（秒）
    pub snippet_length: f64,
    /// 片段數量
    pub snippet_amount: usize,
    /// 輸出正方形邊長（像素）
    pub resolution: u32,
    /// 是否額外加入結尾片段
    pub extra_snippet: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            start_time: 10,
            snippet_length: 0.4,
            snippet_amount: 20,
            resolution: 400,
            extra_snippet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// 外部程序最長等待時間，0 表示不限制
    pub process_timeout_secs: u64,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            process_timeout_secs: 600,
        }
    }
}

impl FfmpegSettings {
    #[must_use]
    pub const fn process_timeout(&self) -> Option<Duration> {
        if self.process_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.process_timeout_secs))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preview_dir: PathBuf,
    pub library_file: PathBuf,
    pub output_extension: String,
    pub preview: PreviewSettings,
    pub ffmpeg: FfmpegSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preview_dir: PathBuf::from("previews"),
            library_file: PathBuf::from("library.json"),
            output_extension: "mp4".to_string(),
            preview: PreviewSettings::default(),
            ffmpeg: FfmpegSettings::default(),
        }
    }
}
