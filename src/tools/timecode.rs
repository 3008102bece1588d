/// 將秒數轉為 ffmpeg `-ss` 使用的 `HH:MM:SS`
///
/// 小數部分直接捨去，只保留整秒。
#[must_use]
pub fn format_seek_timecode(seconds: f64) -> String {
    let total = seconds.max(0.0).trunc() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// 片段長度參數，使用最短的浮點表示（`3`、`0.4`）
#[must_use]
pub fn format_length(seconds: f64) -> String {
    format!("{seconds}")
}
