//! Two-line in-place progress rendering.
//!
//! The renderer owns a fixed viewport of two terminal lines directly above the
//! cursor: a header line and a bar line. Each draw moves up two lines and
//! rewrites both, so scrollback never grows while a process is running.

use crate::progress::{clamp_percent, ProgressEvent};
use console::Term;
use std::io;

const FILLED: char = '█';
const EMPTY: char = '░';

const WIDE_BAR: usize = 50;
const NARROW_BAR: usize = 40;
const WIDE_TERMINAL_COLUMNS: usize = 70;
const FALLBACK_COLUMNS: usize = 80;

/// Bar cell count for a terminal of the given width.
pub fn bar_width_for(columns: usize) -> usize {
    if columns >= WIDE_TERMINAL_COLUMNS {
        WIDE_BAR
    } else {
        NARROW_BAR
    }
}

/// Current terminal width, falling back to `$COLUMNS` and then 80.
pub fn terminal_columns() -> usize {
    if let Some((_rows, cols)) = Term::stdout().size_checked() {
        return usize::from(cols);
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n >= 40)
        .unwrap_or(FALLBACK_COLUMNS)
}

/// Render `[████░░░░] NNN%` for a percentage, clamped to `0..=100`.
pub fn draw_bar(percent: i64, width: usize) -> String {
    let percent = clamp_percent(percent as f64);
    let filled = usize::from(percent) * width / 100;

    let mut bar = String::with_capacity(width * 3 + 8);
    bar.push('[');
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar.push_str("] ");
    bar.push_str(&format!("{:>3}%", percent));
    bar
}

/// The terminal operations the viewport needs.
pub trait Surface {
    fn up(&mut self, lines: usize) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
    fn line(&mut self, text: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

impl Surface for Term {
    fn up(&mut self, lines: usize) -> io::Result<()> {
        self.move_cursor_up(lines)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clear_line()
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.write_line(text)
    }

    fn flush(&mut self) -> io::Result<()> {
        Term::flush(self)
    }
}

/// The last frame drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub header: String,
    pub percent: u8,
}

/// In-place renderer for one monitored process at a time.
///
/// Callers must call [`Renderer::reserve`] before the first draw so that the
/// initial cursor move lands on blank lines instead of earlier output.
pub struct Renderer<S: Surface = Term> {
    surface: S,
    bar_width: usize,
    state: RenderState,
}

impl Renderer<Term> {
    /// Renderer on stdout sized to the current terminal.
    pub fn stdout() -> Self {
        Self::with_bar_width(Term::stdout(), bar_width_for(terminal_columns()))
    }
}

impl<S: Surface> Renderer<S> {
    pub fn with_bar_width(surface: S, bar_width: usize) -> Self {
        Self {
            surface,
            bar_width,
            state: RenderState::default(),
        }
    }

    /// Print the two blank lines the viewport occupies and reset state.
    pub fn reserve(&mut self) -> io::Result<()> {
        self.state = RenderState::default();
        self.surface.line("")?;
        self.surface.line("")?;
        self.surface.flush()
    }

    /// Redraw the viewport with `event`. Writes exactly two lines.
    pub fn draw(&mut self, event: &ProgressEvent) -> io::Result<()> {
        let percent = clamp_percent(event.percent as f64);

        let mut bar = draw_bar(i64::from(percent), self.bar_width);
        if !event.secondary.is_empty() {
            bar.push_str("  ");
            bar.push_str(&event.secondary);
        }

        self.surface.up(2)?;
        self.surface.clear()?;
        self.surface.line(&event.label)?;
        self.surface.clear()?;
        self.surface.line(&bar)?;
        self.surface.flush()?;

        self.state.header.clone_from(&event.label);
        self.state.percent = percent;
        Ok(())
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Records surface operations so tests can inspect what was drawn.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    pub lines: Vec<String>,
    pub moved_up: usize,
    pub cleared: usize,
}

#[cfg(test)]
impl Transcript {
    /// Number of frames drawn since creation.
    pub fn frames(&self) -> usize {
        self.moved_up / 2
    }
}

#[cfg(test)]
impl Surface for Transcript {
    fn up(&mut self, lines: usize) -> io::Result<()> {
        self.moved_up += lines;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.cleared += 1;
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.lines.push(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
