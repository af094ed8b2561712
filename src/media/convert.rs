//! Conversions through ffmpeg with a live progress display.

use super::probe_duration;
use crate::config::ConvertSettings;
use crate::error::Result;
use crate::process::{run_streaming, MonitoredProcess, OutputMode};
use crate::progress::{ProgressParser, TranscodeParser};
use crate::render::{Renderer, Surface};
use console::style;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};

/// Replace (or add) the extension of `path`. A leading dot in `ext` is optional.
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext.trim().trim_start_matches('.'))
}

/// Header shown above the bar while converting.
fn header(input: &Path, output: &Path) -> String {
    format!(
        "{} {} → {}",
        style("🔄 Converting:").cyan(),
        style(file_name(input)).magenta(),
        style(file_name(output)).magenta()
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn ffmpeg_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-y",
        "-hide_banner",
        "-nostats",
        "-loglevel",
        "error",
        "-progress",
        "pipe:1",
        "-i",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    args
}

/// Convert one file, drawing progress from ffmpeg's `-progress` stream.
///
/// The duration probe may fail; the bar then stays at 0 until ffmpeg reports
/// `progress=end`.
#[instrument(skip_all, fields(input = %input.display()))]
pub async fn convert_file<S: Surface>(
    input: &Path,
    output: &Path,
    settings: &ConvertSettings,
    renderer: &mut Renderer<S>,
) -> Result<()> {
    let duration = probe_duration(&settings.ffprobe, input).await;
    debug!("Converting with duration {:?}", duration);

    let process = MonitoredProcess::new(
        &settings.ffmpeg,
        ffmpeg_args(input, output),
        OutputMode::StreamToParser,
    );
    info!("Starting conversion: {}", process.display());

    let mut parser = TranscodeParser::new(duration, header(input, output));
    renderer.reserve()?;
    renderer.draw(&parser.initial_event())?;

    run_streaming(&process, |line| {
        if let Some(event) = parser.parse_line(line) {
            if let Err(e) = renderer.draw(&event) {
                warn!("Failed to draw progress: {}", e);
            }
        }
    })
    .await
}

/// The most recently modified non-hidden files below `root`, newest first.
pub fn find_recent_files(root: &Path, limit: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect_files(root, &mut found);
    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().take(limit).map(|(_, p)| p).collect()
}

fn collect_files(dir: &Path, found: &mut Vec<(SystemTime, PathBuf)>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            collect_files(&path, found);
            continue;
        }

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            found.push((modified, path));
        }
    }
}
