//! Convert command implementation.

use crate::cli::{CursorGuard, Output};
use crate::config::Settings;
use crate::media::{convert_file, find_recent_files, replace_extension, DownloadedFiles};
use crate::render::Renderer;
use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Run the convert command.
pub async fn run_convert(format: &str, files: &[String], settings: &Settings) -> Result<()> {
    let inputs = if files.is_empty() {
        default_inputs(settings)
    } else {
        files.iter().map(PathBuf::from).collect()
    };

    if inputs.is_empty() {
        Output::warning("Nothing to convert.");
        return Ok(());
    }

    convert_all(&inputs, format, settings).await;
    Ok(())
}

/// Files from the last download list, or recent files in the working directory.
pub(crate) fn default_inputs(settings: &Settings) -> Vec<PathBuf> {
    let listed = DownloadedFiles::open(settings.downloaded_list_path()).load();
    if !listed.is_empty() {
        return listed.into_iter().map(PathBuf::from).collect();
    }
    find_recent_files(Path::new("."), settings.convert.recent_files_limit)
}

/// Convert each existing input to `format`, one at a time.
///
/// A failed conversion is reported and the next file is tried. Returns the
/// number of successful conversions.
pub(crate) async fn convert_all(inputs: &[PathBuf], format: &str, settings: &Settings) -> usize {
    let mut converted = 0;
    let mut failed = 0;

    for input in inputs {
        if !input.exists() {
            warn!("Skipping missing file {}", input.display());
            continue;
        }

        let output = replace_extension(input, format);
        if output == *input {
            Output::warning(&format!("{} already has that extension, skipping", input.display()));
            continue;
        }

        let mut renderer = Renderer::stdout();
        let result = {
            let _cursor = CursorGuard::hide();
            convert_file(input, &output, &settings.convert, &mut renderer).await
        };

        match result {
            Ok(()) => {
                converted += 1;
                println!("{} {}", style("✔ Converted:").green(), output.display());
            }
            Err(e) => {
                failed += 1;
                warn!("Conversion of {} failed: {}", input.display(), e);
                println!("{} {} ({})", style("✖ Convert failed:").red(), output.display(), e);
            }
        }
    }

    println!();
    Output::info(&format!("Conversion complete: {} converted, {} failed", converted, failed));
    converted
}
