//! ytpro - a terminal front end for yt-dlp and ffmpeg
//!
//! Downloads single videos or playlist selections with yt-dlp, optionally
//! converts the results with ffmpeg, and shows live progress for both in a
//! fixed two-line region of the terminal.
//!
//! # Architecture
//!
//! - `process` - Spawning and monitoring external tools
//! - `progress` - Parsers turning tool output into progress events
//! - `render` - The two-line progress display
//! - `step` - Spinner-driven steps with output captured to log files
//! - `deps` - Tool detection and installation plans
//! - `selection` - Playlist selection expressions
//! - `media` - Download, conversion, probing and playlist listing
//! - `config` - Configuration management
//! - `cli` - Command line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use ytpro::config::Settings;
//! use ytpro::media::{self, DownloadRequest, DownloadedFiles, PlaylistMode};
//! use ytpro::render::Renderer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let list = DownloadedFiles::create(settings.downloaded_list_path())?;
//!     let request = DownloadRequest {
//!         url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
//!         format: settings.download.default_format.clone(),
//!         mode: PlaylistMode::Single,
//!     };
//!
//!     let files = media::download(&request, &settings.download, &list, &mut Renderer::stdout()).await?;
//!     println!("Downloaded {} file(s)", files);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod media;
pub mod process;
pub mod progress;
pub mod render;
pub mod selection;
pub mod step;

pub use error::{Result, YtproError};
