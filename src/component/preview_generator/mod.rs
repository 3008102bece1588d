//! 影片預覽片段產生元件
//!
//! 每部影片依序經過：
//! A. 取得影片長度（ffprobe）
//! B. 規劃取樣片段
//! C. 逐一擷取片段（裁切右半部並縮放為正方形，無聲）
//! D. 以串流複製合併為單一預覽檔

mod error;
mod main;
mod renderer;
mod scratch_workspace;
mod segment_planner;

pub use error::{PlanError, PreviewError};
pub use main::{BatchOutcome, BatchReport, PREVIEW_LOCK_NAME, PreviewGenerator};
pub use renderer::{MANIFEST_FILE_NAME, PreviewJob, PreviewRenderer};
pub use scratch_workspace::{SCRATCH_DIR_NAME, ScratchWorkspace};
pub use segment_planner::{Segment, TRAILING_SNIPPET_OFFSET_SECS, plan_segments};
