//! Progress parsing for the download and transcode tools.
//!
//! Both parsers turn raw output lines into [`ProgressEvent`]s that the
//! renderer draws. Lines that match no known shape are skipped silently:
//! one bad line must never abort a download or conversion.

pub mod download;
mod percent;
pub mod transcode;

pub use download::{DownloadLine, DownloadParser};
pub use percent::{clamp_percent, normalize_percent};
pub use transcode::{TranscodeParser, TranscodeUpdate};

/// A normalized progress update, consumed immediately by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Completion percentage. Parsers emit `0..=100`; the renderer clamps anyway.
    pub percent: i64,
    /// Header line text.
    pub label: String,
    /// Speed/ETA text, or empty.
    pub secondary: String,
    /// Set on the last event a process will produce.
    pub terminal: bool,
}

impl ProgressEvent {
    pub fn new(percent: i64, label: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            percent,
            label: label.into(),
            secondary: secondary.into(),
            terminal: false,
        }
    }

    /// Mark this as the final event.
    pub fn finished(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Converts raw output lines into progress events.
pub trait ProgressParser {
    /// Parse one line. `None` means the line produced nothing to draw.
    fn parse_line(&mut self, line: &str) -> Option<ProgressEvent>;
}
