//! Small helpers shared by the highlighter, renderer and event normalization.

pub mod json_path;

pub use json_path::PathMapper;

/// Escape the characters that are significant in HTML element content and attributes.
///
/// Single quotes are left alone; every fragment this crate emits uses double-quoted
/// attributes, and SQL literal detection relies on seeing the raw quote.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut `text` to at most `max_chars` characters, appending `...` when something was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
