//! Line prompts on stdin.

use console::style;
use std::io::{self, BufRead, Write};

/// Print `message` and read one line, without the trailing newline.
///
/// End of input reads as an empty line.
pub fn prompt(message: &str) -> io::Result<String> {
    let stdin = io::stdin();
    read_answer(message, &mut stdin.lock(), &mut io::stdout())
}

/// Ask a yes/no question; only `y`/`yes` (any case) count as yes.
pub fn prompt_yes_no(message: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} {} ", message, style("[y/N]").dim()))?;
    Ok(is_yes(&answer))
}

fn read_answer(message: &str, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<String> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
