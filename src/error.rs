//! Error types for ytpro.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for ytpro operations.
///
/// Line-level parse anomalies and failed duration probes never show up here:
/// they are absorbed where they happen and at most logged.
#[derive(Error, Debug)]
pub enum YtproError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("{step} failed (exit code {code}). See log: {}", .log_path.display())]
    StepFailed {
        step: String,
        log_path: PathBuf,
        code: String,
    },

    #[error("{tool} exited with code {code}{}", format_stderr(.stderr))]
    ProcessFailed {
        tool: String,
        code: String,
        stderr: String,
    },

    #[error("Failed reading process output: {0}")]
    StreamRead(#[source] std::io::Error),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Exit code text for a finished process; signal-terminated processes have none.
pub(crate) fn exit_code_text(status: &std::process::ExitStatus) -> String {
    status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Result type alias for ytpro operations.
pub type Result<T> = std::result::Result<T, YtproError>;
