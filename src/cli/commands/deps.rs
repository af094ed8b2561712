//! Deps command - make sure yt-dlp and ffmpeg are installed.

use crate::cli::Output;
use crate::config::Settings;
use crate::deps::{ensure_tools, missing_tools, REQUIRED_TOOLS};
use crate::process::tool_available;
use crate::step::StepRunner;
use anyhow::Result;
use console::style;

/// Check for the required tools, installing whatever is missing.
pub async fn ensure_dependencies(settings: &Settings) -> Result<()> {
    let missing = missing_tools().await;
    if !missing.is_empty() {
        println!(
            "{}",
            style(format!("Checking & installing dependencies ({} missing)…", missing.join(", "))).yellow()
        );
    }

    let mut runner = StepRunner::new(
        settings.log_dir(),
        settings.ui.spinner_interval(),
        settings.ui.log_tail_lines,
    );
    ensure_tools(&mut runner).await?;

    Output::success("All dependencies are installed.");
    Ok(())
}

/// Run the deps command.
pub async fn run_deps(settings: &Settings) -> Result<()> {
    ensure_dependencies(settings).await?;

    Output::header("Tools");
    for tool in REQUIRED_TOOLS {
        let status = if tool_available(tool).await { "found" } else { "missing" };
        Output::list_item(&format!("{tool}: {status}"));
    }
    Output::kv("Step logs", &settings.log_dir().display().to_string());
    Ok(())
}
