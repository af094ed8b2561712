//! Download and conversion runs with live progress.
//!
//! Each run starts one external process, streams its stdout through a
//! progress parser into the renderer, and then waits for it to exit.

pub mod convert;
pub mod download;
mod downloaded;
pub mod playlist;
mod probe;

pub use convert::{convert_file, find_recent_files, replace_extension};
pub use download::{download, DownloadRequest, PlaylistMode};
pub use downloaded::DownloadedFiles;
pub use playlist::{fetch_playlist, is_video_only, PlaylistItem};
pub use probe::probe_duration;
