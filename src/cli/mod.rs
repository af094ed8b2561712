//! CLI module for ytpro.

pub mod commands;
mod output;
mod prompt;

pub use output::{CursorGuard, Output};
pub use prompt::{prompt, prompt_yes_no};

use clap::{Parser, Subcommand};

/// ytpro - yt-dlp + ffmpeg front end
///
/// Downloads videos or playlists with yt-dlp and optionally converts them with
/// ffmpeg, showing live progress in the terminal. Without a subcommand the
/// interactive download flow starts.
#[derive(Parser, Debug)]
#[command(name = "ytpro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "YTPRO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video or playlist interactively (default)
    Download {
        /// Video or playlist URL (prompted for if omitted)
        url: Option<String>,

        /// Treat the URL as a playlist
        #[arg(short, long)]
        playlist: bool,
    },

    /// Convert files with ffmpeg
    Convert {
        /// Target extension, e.g. mp4 or mp3
        #[arg(short, long)]
        format: String,

        /// Files to convert (default: the last download list, then recent files)
        files: Vec<String>,
    },

    /// Check for yt-dlp and ffmpeg and install them if missing
    Deps,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
