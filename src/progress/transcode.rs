//! Transcode-tool progress lines (`ffmpeg -progress pipe:1`).
//!
//! ffmpeg writes blocks of `key=value` lines. Only the elapsed output time and
//! the final `progress=end` marker matter here.

use super::{clamp_percent, ProgressEvent, ProgressParser};
use tracing::trace;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// What a single transcode line means for progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeUpdate {
    /// Elapsed output time translated to a percentage.
    Progress(u8),
    /// `progress=end`: the conversion is complete.
    End,
    Ignored,
}

/// Parser for ffmpeg's progress stream.
///
/// The total duration comes from a separate probe. When it is unknown or not
/// positive every elapsed-time update reports `0` instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct TranscodeParser {
    duration_secs: Option<f64>,
    label: String,
}

impl TranscodeParser {
    pub fn new(duration_secs: Option<f64>, label: impl Into<String>) -> Self {
        Self {
            duration_secs: duration_secs.filter(|d| d.is_finite() && *d > 0.0),
            label: label.into(),
        }
    }

    /// The event drawn before ffmpeg reports anything.
    pub fn initial_event(&self) -> ProgressEvent {
        ProgressEvent::new(0, self.label.clone(), "")
    }

    pub fn decode(&self, line: &str) -> TranscodeUpdate {
        let Some((key, value)) = line.trim().split_once('=') else {
            return TranscodeUpdate::Ignored;
        };

        match key.trim() {
            // out_time_ms is in microseconds despite the name; newer builds
            // also emit the correctly named out_time_us.
            "out_time_ms" | "out_time_us" => match value.trim().parse::<i64>() {
                Ok(micros) => TranscodeUpdate::Progress(self.percent_at(micros)),
                Err(_) => {
                    trace!("Skipping unparsable {}={}", key, value);
                    TranscodeUpdate::Ignored
                }
            },
            "progress" if value.trim() == "end" => TranscodeUpdate::End,
            _ => TranscodeUpdate::Ignored,
        }
    }

    fn percent_at(&self, elapsed_micros: i64) -> u8 {
        match self.duration_secs {
            Some(total) => {
                let elapsed = elapsed_micros as f64 / MICROS_PER_SECOND;
                clamp_percent((elapsed * 100.0 / total).floor())
            }
            None => 0,
        }
    }
}

impl ProgressParser for TranscodeParser {
    fn parse_line(&mut self, line: &str) -> Option<ProgressEvent> {
        match self.decode(line) {
            TranscodeUpdate::Progress(p) => {
                Some(ProgressEvent::new(i64::from(p), self.label.clone(), ""))
            }
            TranscodeUpdate::End => Some(ProgressEvent::new(100, self.label.clone(), "").finished()),
            TranscodeUpdate::Ignored => None,
        }
    }
}
