//! Configuration module for ytpro.
//!
//! Handles loading and saving application settings.

mod settings;

pub use settings::{ConvertSettings, DownloadSettings, GeneralSettings, Settings, UiSettings};
