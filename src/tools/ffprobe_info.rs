use crate::tools::ProcessRunner;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片長度（秒）
pub fn probe_duration(runner: &ProcessRunner, ffprobe_path: &Path, path: &Path) -> Result<f64> {
    // 先確認檔案可讀，避免把權限問題誤報為格式錯誤
    File::open(path).with_context(|| format!("無法開啟影片檔案: {}", path.display()))?;

    let mut command = Command::new(ffprobe_path);
    command
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path);

    let output = runner
        .run(command)
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration(&stdout).with_context(|| format!("無法取得影片長度: {}", path.display()))
}

/// 從 ffprobe JSON 輸出取得第一條視訊串流的長度
///
/// 串流沒有長度資訊時（例如 Matroska）改用容器長度。
fn parse_duration(json: &str) -> Result<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow::anyhow!("找不到視訊串流"))?;

    let raw = video_stream
        .duration
        .as_ref()
        .or_else(|| probe.format.as_ref().and_then(|f| f.duration.as_ref()))
        .ok_or_else(|| anyhow::anyhow!("ffprobe 未回報影片長度"))?;

    let duration: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("影片長度格式錯誤: {raw}"))?;

    if !duration.is_finite() || duration <= 0.0 {
        bail!("影片長度無效: {duration}");
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_from_video_stream() {
        let json = r#"{
            "streams": [
                { "codec_type": "audio", "duration": "999.0" },
                { "codec_type": "video", "duration": "600.040000" }
            ],
            "format": { "duration": "601.5" }
        }"#;
        assert!((parse_duration(json).unwrap() - 600.04).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_falls_back_to_format() {
        let json = r#"{
            "streams": [ { "codec_type": "video" } ],
            "format": { "duration": "42.5" }
        }"#;
        assert!((parse_duration(json).unwrap() - 42.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_without_video_stream() {
        let json = r#"{ "streams": [ { "codec_type": "audio", "duration": "10" } ] }"#;
        assert!(parse_duration(json).is_err());
    }

    #[test]
    fn test_parse_duration_unparsable() {
        let json = r#"{ "streams": [ { "codec_type": "video", "duration": "N/A" } ] }"#;
        assert!(parse_duration(json).is_err());
    }

    #[test]
    fn test_parse_duration_invalid_json() {
        assert!(parse_duration("not json").is_err());
    }
}
