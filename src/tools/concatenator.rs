use crate::tools::ProcessRunner;
use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// ffmpeg concat demuxer 使用的清單檔
///
/// `entries` 的順序就是合併順序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    path: PathBuf,
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// 寫入清單檔；片段以相對於清單所在目錄的檔名列出
    pub fn write(path: &Path, entries: Vec<PathBuf>) -> Result<Self> {
        let manifest = Self {
            path: path.to_path_buf(),
            entries,
        };
        fs::write(path, manifest.render())
            .with_context(|| format!("無法寫入合併清單: {}", path.display()))?;
        Ok(manifest)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let name = entry
                    .file_name()
                    .map_or_else(|| entry.to_string_lossy(), |n| n.to_string_lossy());
                format!("file '{name}'\n")
            })
            .collect()
    }
}

/// 解析清單檔內容，回傳依序列出的檔名
#[must_use]
pub fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .map(str::to_string)
        })
        .collect()
}

#[must_use]
pub fn build_concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.to_string_lossy().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// 以串流複製方式合併片段（不重新編碼）
pub fn concat_segments(
    runner: &ProcessRunner,
    ffmpeg_path: &Path,
    manifest: &ConcatManifest,
    output: &Path,
) -> Result<()> {
    if manifest.entries().is_empty() {
        bail!("合併清單沒有任何片段");
    }

    if let Some(missing) = manifest.entries().iter().find(|p| !p.is_file()) {
        bail!("片段檔案不存在: {}", missing.display());
    }

    debug!(
        "合併 {} 個片段 -> {}",
        manifest.entries().len(),
        output.display()
    );

    let mut command = Command::new(ffmpeg_path);
    command.args(build_concat_args(manifest.path(), output));

    runner
        .run(command)
        .with_context(|| format!("ffmpeg 合併片段失敗: {}", output.display()))?;

    if !output.exists() {
        bail!("預覽檔案未建立: {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_manifest_lists_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let entries: Vec<PathBuf> = (1..=3)
            .map(|i| dir.path().join(format!("{i}.mp4")))
            .collect();

        let manifest = ConcatManifest::write(&dir.path().join("concat.txt"), entries).unwrap();
        let content = fs::read_to_string(manifest.path()).unwrap();

        assert_eq!(content, "file '1.mp4'\nfile '2.mp4'\nfile '3.mp4'\n");
        assert_eq!(parse_manifest(&content), vec!["1.mp4", "2.mp4", "3.mp4"]);
    }

    #[test]
    fn test_build_concat_args() {
        let args = build_concat_args(Path::new("/tmp/job/concat.txt"), Path::new("/out/a.mp4"));
        assert_eq!(
            args[4..],
            [
                "-y",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                "/tmp/job/concat.txt",
                "-c",
                "copy",
                "/out/a.mp4"
            ]
        );
    }

    #[test]
    fn test_missing_segment_fails_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.mp4"), b"segment").unwrap();
        let entries = vec![dir.path().join("1.mp4"), dir.path().join("2.mp4")];
        let manifest = ConcatManifest::write(&dir.path().join("concat.txt"), entries).unwrap();

        let runner = ProcessRunner::new(None, Arc::new(AtomicBool::new(false)));
        let err = concat_segments(
            &runner,
            Path::new("/nonexistent/ffmpeg"),
            &manifest,
            &dir.path().join("out.mp4"),
        )
        .unwrap_err();

        assert!(err.to_string().contains("2.mp4"));
    }
}
