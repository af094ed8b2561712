//! Configuration settings for ytpro.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub convert: ConvertSettings,
    pub ui: UiSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for step logs and the downloaded-files list.
    pub log_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("ytpro").to_string_lossy().into_owned(),
        }
    }
}

/// Download tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadSettings {
    /// yt-dlp executable.
    pub binary: String,
    /// Format used when the format prompt is left blank.
    pub default_format: String,
    /// Output template for single videos.
    pub single_template: String,
    /// Output template for playlist items.
    pub playlist_template: String,
    /// Playlist entries shown per page.
    pub page_size: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            default_format: "bv*+ba".to_string(),
            single_template: "%(title)s.%(ext)s".to_string(),
            playlist_template: "%(playlist_title)s/%(playlist_index)02d - %(title)s.%(ext)s"
                .to_string(),
            page_size: 10,
        }
    }
}

/// Transcode tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConvertSettings {
    /// ffmpeg executable.
    pub ffmpeg: String,
    /// ffprobe executable.
    pub ffprobe: String,
    /// How many recent files to offer when no download list exists.
    pub recent_files_limit: usize,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            recent_files_limit: 10,
        }
    }
}

/// Terminal behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    /// Spinner frame interval for install steps.
    pub spinner_interval_ms: u64,
    /// Log lines shown when a step fails.
    pub log_tail_lines: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            spinner_interval_ms: 120,
            log_tail_lines: 15,
        }
    }
}

impl UiSettings {
    pub fn spinner_interval(&self) -> Duration {
        Duration::from_millis(self.spinner_interval_ms.max(1))
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.download.page_size == 0 {
            return Err(crate::error::YtproError::Config(
                "download.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::YtproError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytpro")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded log directory path.
    pub fn log_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.log_dir)
    }

    /// Path of the downloaded-files list.
    pub fn downloaded_list_path(&self) -> PathBuf {
        self.log_dir().join("downloaded_files.txt")
    }
}
