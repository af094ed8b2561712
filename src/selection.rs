//! Playlist selection expressions such as `1,3,5-7`.
//!
//! Expressions are forwarded to yt-dlp's `--playlist-items` unexpanded; yt-dlp
//! does the range expansion. Locally we only need the first index, to pick a
//! representative item for format probing.

/// Index used when no usable first index can be read.
pub const DEFAULT_INDEX: u32 = 1;

/// Representative item index for one selection expression.
///
/// Only the first comma-separated token is consulted; for a range the part
/// before the hyphen is used. Anything unparsable or below 1 yields 1.
pub fn first_index(expr: &str) -> u32 {
    let first = expr.trim().split(',').next().unwrap_or("").trim();
    let start = match first.split_once('-') {
        Some((start, _)) => start,
        None => first,
    };
    match start.trim().parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).unwrap_or(DEFAULT_INDEX),
        _ => DEFAULT_INDEX,
    }
}

/// The accumulated selection expressions entered by the user, in order.
///
/// Duplicates and out-of-range indices are not checked; yt-dlp decides what
/// to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRange {
    entries: Vec<String>,
}

impl SelectionRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one user entry. Blank input is ignored.
    pub fn push(&mut self, expr: &str) {
        let expr = expr.trim();
        if !expr.is_empty() {
            self.entries.push(expr.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Index of the representative item: from the first entry, or 1.
    pub fn first_index(&self) -> u32 {
        self.entries
            .first()
            .map(|e| first_index(e))
            .unwrap_or(DEFAULT_INDEX)
    }

    /// Value for `--playlist-items`, or `None` when nothing was selected.
    pub fn playlist_items(&self) -> Option<String> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.join(","))
        }
    }

    /// Best-effort expansion into concrete indices, for display only.
    ///
    /// Tokens that are not a positive integer or an ascending `A-B` range are
    /// skipped. Order and duplicates are kept.
    pub fn indices(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for token in self.entries.iter().flat_map(|e| e.split(',')) {
            let token = token.trim();
            match token.split_once('-') {
                Some((a, b)) => {
                    if let (Ok(a), Ok(b)) = (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
                        if a >= 1 && a <= b {
                            out.extend(a..=b);
                        }
                    }
                }
                None => {
                    if let Ok(n) = token.parse::<u32>() {
                        if n >= 1 {
                            out.push(n);
                        }
                    }
                }
            }
        }
        out
    }
}

/// What a line typed at the playlist page prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInput {
    /// `n`: show the next page without selecting anything.
    Next,
    /// `0`: stop selecting.
    Done,
    /// A selection expression for this page.
    Select(String),
    /// Blank input: move on to the next page.
    Skip,
}

impl PageInput {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "n" | "N" => PageInput::Next,
            "0" => PageInput::Done,
            "" => PageInput::Skip,
            other => PageInput::Select(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_index() {
        assert_eq!(first_index("5-7,2"), 5);
        assert_eq!(first_index("1,3,5-7"), 1);
        assert_eq!(first_index(" 12 "), 12);
        assert_eq!(first_index("3 - 9"), 3);
    }

    #[test]
    fn test_first_index_defaults_to_one() {
        assert_eq!(first_index("abc"), 1);
        assert_eq!(first_index(""), 1);
        assert_eq!(first_index("0"), 1);
        assert_eq!(first_index("-4"), 1);
        assert_eq!(first_index(",7"), 1);
        assert_eq!(first_index("99999999999"), 1);
    }

    #[test]
    fn test_selection_range_uses_first_entry() {
        let mut sel = SelectionRange::new();
        assert_eq!(sel.first_index(), 1);
        assert_eq!(sel.playlist_items(), None);

        sel.push("  ");
        assert!(sel.is_empty());

        sel.push("5-7,2");
        sel.push("12");
        assert_eq!(sel.first_index(), 5);
        assert_eq!(sel.playlist_items().as_deref(), Some("5-7,2,12"));
    }

    #[test]
    fn test_entries_are_forwarded_verbatim() {
        let mut sel = SelectionRange::new();
        sel.push("3,3,x");
        assert_eq!(sel.entries(), ["3,3,x"]);
        assert_eq!(sel.playlist_items().as_deref(), Some("3,3,x"));
    }

    #[test]
    fn test_indices_best_effort() {
        let mut sel = SelectionRange::new();
        sel.push("1,3,5-7");
        sel.push("3,9-8,abc,0");
        assert_eq!(sel.indices(), vec![1, 3, 5, 6, 7, 3]);
    }

    #[test]
    fn test_page_input() {
        assert_eq!(PageInput::parse("n"), PageInput::Next);
        assert_eq!(PageInput::parse(" N "), PageInput::Next);
        assert_eq!(PageInput::parse("0"), PageInput::Done);
        assert_eq!(PageInput::parse(""), PageInput::Skip);
        assert_eq!(PageInput::parse("2,4-5"), PageInput::Select("2,4-5".into()));
    }
}
