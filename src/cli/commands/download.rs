//! Download command - the interactive download flow.

use super::convert::{convert_all, default_inputs};
use super::deps::ensure_dependencies;
use crate::cli::{prompt, prompt_yes_no, CursorGuard, Output};
use crate::config::Settings;
use crate::media::{self, is_video_only, DownloadRequest, DownloadedFiles, PlaylistItem, PlaylistMode};
use crate::process::run_passthrough;
use crate::render::Renderer;
use crate::selection::{PageInput, SelectionRange};
use anyhow::{bail, Result};
use console::{style, Term};
use std::path::PathBuf;

/// Run the interactive download flow.
pub async fn run_download(url: Option<String>, playlist: bool, settings: &Settings) -> Result<()> {
    Output::banner();
    ensure_dependencies(settings).await?;
    println!();

    let playlist = match (&url, playlist) {
        (_, true) => true,
        (Some(_), false) => false,
        (None, false) => {
            let choice = prompt("Select download mode:\n  1) Single Video\n  2) Playlist\nEnter choice (1 or 2): ")?;
            match choice.trim() {
                "1" => false,
                "2" => true,
                _ => bail!("Invalid choice."),
            }
        }
    };

    let dl = &settings.download;
    let (url, mode, first_index) = if playlist {
        let url = url_or_prompt(url, "📜 Enter playlist URL: ")?;
        Output::notice("📡 Fetching playlist details…");
        let items = media::fetch_playlist(&dl.binary, &url).await?;
        if items.is_empty() {
            Output::warning("The playlist appears to be empty.");
        }

        let selection = select_items(&items, dl.page_size)?;
        let first = selection.first_index();
        if !selection.is_empty() {
            Output::info(&format!("{} item(s) selected", selection.indices().len()));
        }

        Output::notice(&format!("📡 Fetching formats for playlist item {first}…"));
        let item = first.to_string();
        run_passthrough(&dl.binary, ["-F", "--playlist-items", item.as_str(), url.as_str()]).await?;

        let mode = PlaylistMode::Playlist {
            items: selection.playlist_items(),
        };
        (url, mode, first)
    } else {
        let url = url_or_prompt(url, "🎯 Enter video URL: ")?;
        Output::notice("📡 Fetching available formats…");
        run_passthrough(&dl.binary, ["-F", url.as_str()]).await?;
        (url, PlaylistMode::Single, 1)
    };

    let format = choose_format(settings, &url, first_index).await?;

    let list = DownloadedFiles::create(settings.downloaded_list_path())?;
    println!("\n{}", style("🚀 Starting download…").green());

    let request = DownloadRequest { url, format, mode };
    let mut renderer = Renderer::stdout();
    {
        let _cursor = CursorGuard::hide();
        media::download(&request, dl, &list, &mut renderer).await?;
    }
    Output::success("Download(s) finished.");

    if prompt_yes_no("🔄 Convert file(s)?")? {
        let ext = prompt("🎯 Enter output format: ")?;
        let ext = ext.trim();
        if ext.is_empty() {
            bail!("No output format given.");
        }

        let mut inputs: Vec<PathBuf> = list.load().into_iter().map(PathBuf::from).collect();
        if inputs.is_empty() {
            inputs = default_inputs(settings);
        }
        convert_all(&inputs, ext, settings).await;
    } else {
        Output::success("Download completed without conversion.");
    }

    Output::footer();
    Ok(())
}

/// The URL given on the command line, or one read from the prompt.
///
/// Blank input is rejected before anything is run against it.
fn url_or_prompt(given: Option<String>, message: &str) -> Result<String> {
    let url = match given {
        Some(u) => u,
        None => prompt(message)?,
    };
    let url = url.trim();
    if url.is_empty() {
        bail!("No URL given.");
    }
    Ok(url.to_string())
}

/// Ask for a format code; blank means the default, video-only codes get audio merged in.
async fn choose_format(settings: &Settings, url: &str, first_index: u32) -> Result<String> {
    let code = prompt("🎥 Enter format code (blank=best): ")?;
    let code = code.trim();
    if code.is_empty() {
        return Ok(settings.download.default_format.clone());
    }

    if is_video_only(&settings.download.binary, code, url, first_index).await {
        println!("{}", style("🎧 Adding best audio…").cyan());
        Ok(format!("{code}+ba"))
    } else {
        Ok(code.to_string())
    }
}

/// Page through the playlist collecting selection expressions.
fn select_items(items: &[PlaylistItem], page_size: usize) -> Result<SelectionRange> {
    let term = Term::stdout();
    let total = items.len();
    let mut selection = SelectionRange::new();
    let mut start = 0;

    while start < total {
        let end = (start + page_size).min(total);
        let _ = term.clear_screen();
        println!(
            "{}",
            style(format!("Playlist Videos (Items {} to {} of {}):", start + 1, end, total))
                .cyan()
                .bold()
        );
        for item in &items[start..end] {
            println!(
                "{}) {} {}",
                style(format!("{:03}", item.index)).magenta(),
                item.title,
                style(format!("[{}]", item.duration)).dim()
            );
        }
        println!();
        println!("n) Load next {} items", page_size);
        println!("0) Done selecting");

        match PageInput::parse(&prompt("🎯 Enter selections (e.g., 1,3,5-7): ")?) {
            PageInput::Done => break,
            PageInput::Select(expr) => selection.push(&expr),
            PageInput::Next | PageInput::Skip => {}
        }
        start += page_size;
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_url_is_rejected() {
        let err = url_or_prompt(Some("   ".into()), "URL: ").unwrap_err();
        assert_eq!(err.to_string(), "No URL given.");
    }

    #[test]
    fn test_given_url_is_trimmed() {
        let url = url_or_prompt(Some(" https://example.com/watch?v=1 \n".into()), "URL: ").unwrap();
        assert_eq!(url, "https://example.com/watch?v=1");
    }
}
