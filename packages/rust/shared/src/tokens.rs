//! Token estimation and budget truncation.
//!
//! Uses a character heuristic: one token is roughly four characters.
//! Lengths are counted in chars so truncation never splits a code point.

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Appended to any text cut down by [`truncate_to_token_budget`].
pub const TRUNCATION_MARKER: &str = "\n[...truncated...]";

/// Room reserved at the end of a truncated text for the marker.
const TRUNCATION_RESERVE: usize = 20;

/// Estimate the token count for a string, rounding up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Truncate `text` so it fits a budget of `max_tokens` tokens.
///
/// Text within budget is returned unchanged. Otherwise the first
/// `max_tokens * 4 - 20` chars are kept and [`TRUNCATION_MARKER`] appended.
pub fn truncate_to_token_budget(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens * CHARS_PER_TOKEN;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(TRUNCATION_RESERVE);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Return at most the first `max_chars` chars of `text`.
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
