//! Percentage normalization.

/// Added before flooring so that values like `56.999999` from float
/// formatting land on the integer they were meant to be.
const FLOOR_EPSILON: f64 = 0.00001;

/// Normalize a free-form percentage token to an integer in `0..=100`.
///
/// Accepts things like `"37%"`, `" 42 "` or `"~87.2%"`: only digits and
/// decimal points are kept. Anything that still fails to parse
/// yields `0`, never an error.
pub fn normalize_percent(token: &str) -> u8 {
    let trimmed = token.trim().trim_end_matches('%').trim();

    let numeric: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if numeric.is_empty() {
        return 0;
    }

    match numeric.parse::<f64>() {
        Ok(value) => clamp_percent((value + FLOOR_EPSILON).floor()),
        Err(_) => 0,
    }
}

/// Clamp an arbitrary float to `0..=100`, treating NaN as zero.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= 100.0 {
        100
    } else {
        value as u8
    }
}
