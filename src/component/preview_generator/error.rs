use std::path::PathBuf;

/// 取樣參數與影片長度無法產生有效片段
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("片段數量必須大於 0")]
    ZeroSnippetAmount,

    #[error("影片長度無效: {0}")]
    InvalidDuration(f64),

    #[error("片段長度無效: {0}")]
    InvalidSnippetLength(f64),

    #[error("起始偏移 {start_time}s 過大，取樣間隔為 {interval:.3}s")]
    NonPositiveInterval { start_time: u32, interval: f64 },

    #[error("片段 {ordinal} 起點 {start:.3}s 已達影片結尾 ({duration:.3}s)")]
    StartBeyondDuration {
        ordinal: usize,
        start: f64,
        duration: f64,
    },

    #[error("結尾片段起點為負 ({start:.3}s)，影片長度不足")]
    NegativeTrailingStart { start: f64 },
}

/// 單一項目預覽產生失敗；不會中止整個批次
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("暫存目錄操作失敗 {dir}: {source}", dir = .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無法讀取影片資訊 {file}: {reason}", file = .path.display())]
    Probe { path: PathBuf, reason: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("片段 {ordinal} 擷取失敗: {reason}")]
    Extract { ordinal: usize, reason: String },

    #[error("合併預覽失敗: {0}")]
    Concat(String),

    #[error("無法輸出預覽檔案 {file}: {source}", file = .path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("操作已取消")]
    Cancelled,
}
