//! Duration probing with ffprobe.

use crate::process::capture_stdout;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, warn};

/// Query a media file's duration in seconds.
///
/// Any failure (missing ffprobe, non-zero exit, unparsable or non-positive
/// duration) returns `None`; conversion then proceeds with progress stuck at 0.
pub async fn probe_duration(ffprobe: &str, path: &Path) -> Option<f64> {
    let args = [
        OsStr::new("-v"),
        OsStr::new("quiet"),
        OsStr::new("-print_format"),
        OsStr::new("json"),
        OsStr::new("-show_format"),
        path.as_os_str(),
    ];

    let stdout = match capture_stdout(ffprobe, args).await {
        Ok(out) => out,
        Err(e) => {
            warn!("Duration probe failed for {}: {}", path.display(), e);
            return None;
        }
    };

    let duration = parse_probe_output(&stdout);
    if duration.is_none() {
        warn!("No usable duration for {}", path.display());
    } else {
        debug!("Probed duration of {}: {:?}s", path.display(), duration);
    }
    duration
}

/// Extract `format.duration` from ffprobe's JSON output.
fn parse_probe_output(json_str: &str) -> Option<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;

    // ffprobe prints the duration as a string; accept a bare number too
    let duration = match &parsed["format"]["duration"] {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    (duration.is_finite() && duration > 0.0).then_some(duration)
}
