//! Display truncation

use lazy_static::lazy_static;
use regex::Regex;

/// Appended when a display string is cut short
pub const ELLIPSIS: char = '…';

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").expect("valid line break regex");
}

/// Prepares a raw field for display within `max_len` characters
///
/// Line breaks collapse to single spaces and the result is trimmed. If it is
/// still longer than `max_len` characters, it is cut to `max_len - 1`
/// characters, trimmed again, and terminated with [`ELLIPSIS`].
///
/// # Examples
///
/// ```
/// use serp_scout::extract::clean_text;
///
/// assert_eq!(clean_text("  Bend\nPlumbing  ", 120), "Bend Plumbing");
/// assert_eq!(clean_text("abcdefghij", 5), "abcd…");
/// ```
pub fn clean_text(text: &str, max_len: usize) -> String {
    let flattened = LINE_BREAKS.replace_all(text, " ");
    let trimmed = flattened.trim();

    if trimmed.chars().count() <= max_len {
        return trimmed.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let mut cut: String = trimmed.chars().take(max_len - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

/// [`clean_text`] over an optional field; absent becomes empty
pub fn clean_optional(text: Option<&str>, max_len: usize) -> String {
    text.map(|t| clean_text(t, max_len)).unwrap_or_default()
}
