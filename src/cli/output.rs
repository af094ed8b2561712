//! CLI output formatting utilities.

use console::{style, Term};

const RULE: &str = "=============================================";

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a progress notice, e.g. before a slow external call.
    pub fn notice(msg: &str) {
        println!("\n{}", style(msg).yellow());
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{}", style(format!("✅ {msg}")).green());
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        println!("{}", style(format!("✖ {msg}")).red());
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Clear the screen and print the banner.
    pub fn banner() {
        let _ = Term::stdout().clear_screen();
        println!("{}", style(RULE).cyan());
        println!(
            "{}",
            style(format!("         ytpro {}", env!("CARGO_PKG_VERSION"))).green().bold()
        );
        println!("{}", style("     Powered by yt-dlp + ffmpeg").yellow());
        println!("{}\n", style(RULE).cyan());
    }

    /// Print the closing footer.
    pub fn footer() {
        println!("\n{}", style(RULE).cyan());
        println!("{}", style("   🎉 Thank you for using ytpro!").green().bold());
        println!("{}", style(RULE).cyan());
    }
}

/// Hides the terminal cursor while alive.
///
/// Live progress redraws look cleaner without a blinking cursor; the cursor is
/// shown again on drop, including when an error unwinds the caller.
pub struct CursorGuard {
    term: Term,
}

impl CursorGuard {
    pub fn hide() -> Self {
        let term = Term::stdout();
        let _ = term.hide_cursor();
        Self { term }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
    }
}
