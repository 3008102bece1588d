pub mod load;
pub mod types;

pub use load::DEFAULT_SETTINGS_FILE;
pub use types::{Config, FfmpegSettings, PreviewSettings};
