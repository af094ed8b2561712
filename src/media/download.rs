//! Downloads through yt-dlp with a live two-line progress display.

use super::DownloadedFiles;
use crate::config::DownloadSettings;
use crate::error::Result;
use crate::process::{run_streaming, MonitoredProcess, OutputMode};
use crate::progress::download::template_args;
use crate::progress::{DownloadParser, ProgressParser};
use crate::render::{Renderer, Surface};
use tracing::{info, instrument, warn};

/// Whether a URL is fetched as a single video or as (part of) a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistMode {
    Single,
    /// Optional `--playlist-items` value; `None` downloads everything.
    Playlist { items: Option<String> },
}

/// Everything needed to build one yt-dlp invocation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub format: String,
    pub mode: PlaylistMode,
}

impl DownloadRequest {
    /// Full argument list, including the progress templates the parser expects.
    pub fn args(&self, settings: &DownloadSettings) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.format.clone()];

        let template = match &self.mode {
            PlaylistMode::Single => {
                args.push("--no-playlist".into());
                &settings.single_template
            }
            PlaylistMode::Playlist { items } => {
                args.push("--yes-playlist".into());
                if let Some(items) = items {
                    args.push("--playlist-items".into());
                    args.push(items.clone());
                }
                &settings.playlist_template
            }
        };

        args.push("-o".into());
        args.push(template.clone());
        args.push(self.url.clone());
        args.extend(template_args());
        args
    }
}

/// Run a download, drawing progress and recording finished files.
///
/// The renderer's two viewport lines are reserved here. Returns the number
/// of files yt-dlp reported as finished.
#[instrument(skip_all, fields(url = %request.url))]
pub async fn download<S: Surface>(
    request: &DownloadRequest,
    settings: &DownloadSettings,
    list: &DownloadedFiles,
    renderer: &mut Renderer<S>,
) -> Result<usize> {
    let process = MonitoredProcess::new(
        &settings.binary,
        request.args(settings),
        OutputMode::StreamToParser,
    );
    info!("Starting download: {}", process.display());

    renderer.reserve()?;

    let mut parser = DownloadParser::new();
    let mut produced = 0usize;

    run_streaming(&process, |line| {
        if let Some(event) = parser.parse_line(line) {
            if let Err(e) = renderer.draw(&event) {
                warn!("Failed to draw progress: {}", e);
            }
        }
        for path in parser.take_produced() {
            produced += 1;
            if let Err(e) = list.append(&path) {
                warn!("Could not record {} in {}: {}", path, list.path().display(), e);
            }
        }
    })
    .await?;

    info!("Download finished, {} file(s) produced", produced);
    Ok(produced)
}
