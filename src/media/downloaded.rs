//! The downloaded-files list.
//!
//! One path per line, appended as yt-dlp reports each finished file. The list
//! is read back afterwards to decide what to convert.

use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DownloadedFiles {
    path: PathBuf,
}

impl DownloadedFiles {
    /// Create (or truncate) the list at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, b"")?;
        Ok(Self { path })
    }

    /// Use an existing list without truncating it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. The file is opened and closed on every call.
    pub fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// All non-blank entries, trimmed. A missing list reads as empty.
    pub fn load(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
