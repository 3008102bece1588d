mod concatenator;
mod ffprobe_info;
mod media_engine;
mod path_validator;
mod process_lock;
mod process_runner;
mod snippet_extractor;
mod timecode;

pub use concatenator::{ConcatManifest, build_concat_args, concat_segments, parse_manifest};
pub use ffprobe_info::probe_duration;
pub use media_engine::{FfmpegEngine, MediaEngine};
pub use path_validator::ensure_directory_exists;
pub use process_lock::{
    FileLockService, LockGuard, LockService, MemoryLockService, try_lock,
};
pub use process_runner::{ProcessError, ProcessOutput, ProcessRunner};
pub use snippet_extractor::{SnippetRequest, extract_snippet};
pub use timecode::{format_length, format_seek_timecode};
