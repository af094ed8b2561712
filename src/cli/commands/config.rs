//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: &Settings, path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::info(&format!("Config file exists: {}", config_path.display()));
            } else {
                Settings::default().save_to(&config_path)?;
                Output::success(&format!("Created config file: {}", config_path.display()));
            }
            Output::kv("Log directory", &settings.log_dir().display().to_string());
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
