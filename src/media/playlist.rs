//! Playlist listing and format inspection through yt-dlp.

use crate::error::Result;
use crate::process::capture_stdout;
use regex::Regex;
use tracing::{debug, warn};

/// One entry of a flat playlist listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    pub index: u32,
    pub title: String,
    /// `MM:SS` / `HH:MM:SS`, or `--` when unknown.
    pub duration: String,
}

/// List a playlist's entries without downloading anything.
pub async fn fetch_playlist(binary: &str, url: &str) -> Result<Vec<PlaylistItem>> {
    let stdout = capture_stdout(binary, ["--flat-playlist", "--dump-json", "--no-warnings", url]).await?;
    let items = parse_playlist(&stdout);
    debug!("Playlist has {} entries", items.len());
    Ok(items)
}

/// Parse `--dump-json` output: one JSON object per line.
fn parse_playlist(stdout: &str) -> Vec<PlaylistItem> {
    let mut items = Vec::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let json: serde_json::Value = match serde_json::from_str(line) {
            Ok(json) => json,
            Err(e) => {
                debug!("Skipping malformed playlist line: {}", e);
                continue;
            }
        };

        let position = items.len() as u32 + 1;
        let index = json["playlist_index"]
            .as_u64()
            .and_then(|i| u32::try_from(i).ok())
            .unwrap_or(position);

        let title = json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        let duration = json["duration_string"]
            .as_str()
            .map(String::from)
            .or_else(|| json["duration"].as_f64().map(format_duration))
            .unwrap_or_else(|| "--".to_string());

        items.push(PlaylistItem { index, title, duration });
    }

    items
}

/// Format seconds as MM:SS or HH:MM:SS.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Whether format `code` is listed as video-only for the representative item.
///
/// Used to decide if best audio must be merged in. Any failure answers `false`.
pub async fn is_video_only(binary: &str, code: &str, url: &str, item: u32) -> bool {
    let index = item.to_string();
    match capture_stdout(binary, ["-F", "--playlist-items", index.as_str(), url]).await {
        Ok(listing) => listing_marks_video_only(&listing, code),
        Err(e) => {
            warn!("Could not list formats: {}", e);
            false
        }
    }
}

fn listing_marks_video_only(listing: &str, code: &str) -> bool {
    let pattern = format!(r"^\s*{}\b.*video\s+only", regex::escape(code));
    let Ok(re) = Regex::new(&pattern) else {
        return false;
    };
    listing.lines().any(|line| re.is_match(line))
}
