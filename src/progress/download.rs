//! Download-tool progress lines.
//!
//! yt-dlp is asked to print three kinds of line (see [`template_args`]):
//! a `START|<filename>` line before each download, a `FILE|<path>` line once a
//! file has been moved into place, and a pipe-delimited progress record for
//! every tick.

use super::{normalize_percent, ProgressEvent, ProgressParser};
use console::style;
use std::path::Path;

const START_PREFIX: &str = "START|";
const FILE_PREFIX: &str = "FILE|";
const PROGRESS_TEMPLATE: &str =
    "%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s|%(filename)s";

/// Shown when the tool leaves speed or ETA blank.
pub const NOT_AVAILABLE: &str = "N/A";

/// Arguments that make yt-dlp emit lines this module understands.
pub fn template_args() -> Vec<String> {
    vec![
        "--newline".into(),
        // --print implies --quiet, which would hide the progress lines
        "--progress".into(),
        "--progress-template".into(),
        PROGRESS_TEMPLATE.into(),
        "--print".into(),
        format!("before_dl:{START_PREFIX}%(filename)s"),
        "--print".into(),
        format!("after_move:{FILE_PREFIX}%(filepath)s"),
    ]
}

/// One decoded download-tool line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadLine {
    /// A download is about to start; carries the destination filename.
    Start { filename: String },
    /// A file is complete; carries its final path verbatim.
    FileProduced { path: String },
    /// A progress tick.
    Tick {
        percent: u8,
        speed: String,
        eta: String,
        filename: String,
    },
    Unrecognized,
}

impl DownloadLine {
    pub fn decode(line: &str) -> Self {
        if let Some(file) = line.strip_prefix(START_PREFIX) {
            return DownloadLine::Start {
                filename: base_name(file),
            };
        }

        if let Some(path) = line.strip_prefix(FILE_PREFIX) {
            return DownloadLine::FileProduced {
                path: path.to_string(),
            };
        }

        let fields: Vec<&str> = line.splitn(4, '|').collect();
        match fields.as_slice() {
            [percent, speed, eta, filename] => DownloadLine::Tick {
                percent: normalize_percent(percent),
                speed: or_not_available(speed),
                eta: or_not_available(eta),
                filename: base_name(filename),
            },
            _ => DownloadLine::Unrecognized,
        }
    }
}

fn or_not_available(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Final path component, or the trimmed input if there is none.
pub(crate) fn base_name(path: &str) -> String {
    let trimmed = path.trim();
    Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| trimmed.to_string())
}

fn header(filename: &str) -> String {
    format!("{} {}", style("📥 Downloading:").cyan(), style(filename).magenta())
}

fn speed_eta(speed: &str, eta: &str) -> String {
    format!(
        "{} {}  {} {}",
        style("Speed:").yellow(),
        speed,
        style("ETA:").yellow(),
        eta
    )
}

/// Stateful download parser.
///
/// `FILE|` lines are not drawn; their paths are queued until the caller
/// collects them with [`DownloadParser::take_produced`].
#[derive(Debug, Default)]
pub struct DownloadParser {
    produced: Vec<String>,
}

impl DownloadParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the paths of files completed since the last call.
    pub fn take_produced(&mut self) -> Vec<String> {
        std::mem::take(&mut self.produced)
    }
}

impl ProgressParser for DownloadParser {
    fn parse_line(&mut self, line: &str) -> Option<ProgressEvent> {
        match DownloadLine::decode(line) {
            DownloadLine::Start { filename } => {
                Some(ProgressEvent::new(0, header(&filename), speed_eta("--", "--")))
            }
            DownloadLine::FileProduced { path } => {
                self.produced.push(path);
                None
            }
            DownloadLine::Tick {
                percent,
                speed,
                eta,
                filename,
            } => Some(ProgressEvent::new(
                i64::from(percent),
                header(&filename),
                speed_eta(&speed, &eta),
            )),
            DownloadLine::Unrecognized => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tick() {
        assert_eq!(
            DownloadLine::decode(" 87.2%|1.2MiB/s|00:05|video.mp4"),
            DownloadLine::Tick {
                percent: 87,
                speed: "1.2MiB/s".into(),
                eta: "00:05".into(),
                filename: "video.mp4".into(),
            }
        );
    }

    #[test]
    fn test_blank_speed_and_eta_become_not_available() {
        match DownloadLine::decode("  |  |  |clip.mp4") {
            DownloadLine::Tick {
                percent,
                speed,
                eta,
                filename,
            } => {
                assert_eq!(percent, 0);
                assert_eq!(speed, "N/A");
                assert_eq!(eta, "N/A");
                assert_eq!(filename, "clip.mp4");
            }
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_tick_filename_is_reduced_to_base_name() {
        match DownloadLine::decode("50%|1MiB/s|00:10|My List/01 - intro.f137.mp4") {
            DownloadLine::Tick { filename, .. } => assert_eq!(filename, "01 - intro.f137.mp4"),
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_filename_may_contain_pipes() {
        match DownloadLine::decode("10%|1MiB/s|00:10|a|b.mp4") {
            DownloadLine::Tick { filename, .. } => assert_eq!(filename, "a|b.mp4"),
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_start_and_file() {
        assert_eq!(
            DownloadLine::decode("START|downloads/My Video.webm"),
            DownloadLine::Start {
                filename: "My Video.webm".into()
            }
        );
        assert_eq!(
            DownloadLine::decode("FILE|/home/me/My Video.mkv"),
            DownloadLine::FileProduced {
                path: "/home/me/My Video.mkv".into()
            }
        );
    }

    #[test]
    fn test_unrecognized_lines() {
        assert_eq!(DownloadLine::decode("[youtube] abc: Downloading webpage"), DownloadLine::Unrecognized);
        assert_eq!(DownloadLine::decode(""), DownloadLine::Unrecognized);
        assert_eq!(DownloadLine::decode("a|b"), DownloadLine::Unrecognized);
    }

    #[test]
    fn test_parser_events() {
        let mut parser = DownloadParser::new();

        let start = parser.parse_line("START|clip.mp4").unwrap();
        assert_eq!(start.percent, 0);
        assert!(start.label.contains("clip.mp4"));
        assert!(start.secondary.contains("--"));

        let tick = parser.parse_line(" 87.2%|1.2MiB/s|00:05|video.mp4").unwrap();
        assert_eq!(tick.percent, 87);
        assert!(tick.label.contains("video.mp4"));
        assert!(tick.secondary.contains("1.2MiB/s"));
        assert!(tick.secondary.contains("00:05"));
        assert!(!tick.terminal);

        assert!(parser.parse_line("[download] Destination: clip.mp4").is_none());
    }

    #[test]
    fn test_produced_files_are_queued_not_drawn() {
        let mut parser = DownloadParser::new();
        assert!(parser.parse_line("FILE|/tmp/a.mp4").is_none());
        assert!(parser.parse_line("FILE|/tmp/b.mp4").is_none());
        assert_eq!(parser.take_produced(), vec!["/tmp/a.mp4", "/tmp/b.mp4"]);
        assert!(parser.take_produced().is_empty());
    }

    #[test]
    fn test_template_args_match_decoder_prefixes() {
        let args = template_args();
        assert!(args.contains(&"before_dl:START|%(filename)s".to_string()));
        assert!(args.contains(&"after_move:FILE|%(filepath)s".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "--print").count(), 2);
    }
}
