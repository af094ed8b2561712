//! ytpro CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ytpro::cli::{commands, Cli, Commands, Output};
use ytpro::config::Settings;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        Output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout belongs to the progress display
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ytpro={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Step logs and the downloaded-files list live here
    std::fs::create_dir_all(settings.log_dir())?;

    match cli.command {
        None => {
            commands::run_download(None, false, &settings).await?;
        }

        Some(Commands::Download { url, playlist }) => {
            commands::run_download(url, playlist, &settings).await?;
        }

        Some(Commands::Convert { format, files }) => {
            commands::run_convert(&format, &files, &settings).await?;
        }

        Some(Commands::Deps) => {
            commands::run_deps(&settings).await?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(&action, &settings, config_path)?;
        }
    }

    Ok(())
}
