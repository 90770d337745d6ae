//! SEO signal extraction from raw page markup
//!
//! This module pulls the handful of fields the competitor view needs out of an
//! HTML document by pattern matching:
//! - Page title (first `<title>` block)
//! - Meta description (first `<meta name="description" content="...">`, either
//!   attribute order)
//! - First `<h1>` heading, with nested tags stripped
//! - Visible word count, ignoring `<script>` and `<style>` blocks
//!
//! Extraction is pure: no I/O, no shared state, and malformed markup only ever
//! produces absent fields.

mod entities;
mod text;

pub use entities::decode_entities;
pub use text::{clean_optional, clean_text, ELLIPSIS};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref TITLE_REGEX: Regex =
        Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("valid title regex");
    static ref META_TAG_REGEX: Regex =
        Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("valid meta regex");
    static ref META_NAME_REGEX: Regex =
        Regex::new(r#"(?is)(?:^|\s)name\s*=\s*["']\s*description\s*["']"#).expect("valid name regex");
    static ref META_CONTENT_REGEX: Regex =
        Regex::new(r#"(?is)(?:^|\s)content\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid content regex");
    static ref H1_REGEX: Regex =
        Regex::new(r"(?is)<h1(?:\s[^>]*)?>(.*?)</h1\s*>").expect("valid h1 regex");
    static ref SCRIPT_REGEX: Regex =
        Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid script regex");
    static ref STYLE_REGEX: Regex =
        Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid style regex");
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").expect("valid tag regex");
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
    static ref WORD_REGEX: Regex = Regex::new(r"\w+").expect("valid word regex");
}

/// Fields extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    /// Trimmed, entity-decoded `<title>` text
    pub title_raw: Option<String>,

    /// Trimmed, entity-decoded meta description
    pub meta_description_raw: Option<String>,

    /// First heading text with tags stripped and whitespace collapsed
    pub h1_raw: Option<String>,

    /// Number of word tokens in the visible text
    pub word_count: usize,
}

/// Extracts all SEO signals from a markup string
///
/// # Example
///
/// ```
/// use serp_scout::extract::extract;
///
/// let html = r#"<html><head><title>Bend Plumbing &amp; Drain</title>
/// <meta content="Local plumbers" name="description"></head>
/// <body><h1>Fast <em>local</em> service</h1><p>Call today</p></body></html>"#;
///
/// let page = extract(html);
/// assert_eq!(page.title_raw.as_deref(), Some("Bend Plumbing & Drain"));
/// assert_eq!(page.meta_description_raw.as_deref(), Some("Local plumbers"));
/// assert_eq!(page.h1_raw.as_deref(), Some("Fast local service"));
/// ```
pub fn extract(markup: &str) -> PageSignals {
    PageSignals {
        title_raw: extract_title(markup),
        meta_description_raw: extract_meta_description(markup),
        h1_raw: extract_h1(markup),
        word_count: count_words(markup),
    }
}

/// First `<title>` block, trimmed then decoded
pub fn extract_title(markup: &str) -> Option<String> {
    let raw = TITLE_REGEX.captures(markup)?.get(1)?.as_str().trim();
    non_empty(raw).map(decode_entities)
}

/// First `<meta>` tag carrying both `name="description"` and `content`
pub fn extract_meta_description(markup: &str) -> Option<String> {
    META_TAG_REGEX
        .find_iter(markup)
        .map(|tag| tag.as_str())
        .filter(|tag| META_NAME_REGEX.is_match(tag))
        .find_map(|tag| {
            let caps = META_CONTENT_REGEX.captures(tag)?;
            caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
        })
        .and_then(|content| non_empty(content.trim()))
        .map(decode_entities)
}

/// First `<h1>` block with nested tags stripped and whitespace collapsed
pub fn extract_h1(markup: &str) -> Option<String> {
    let block = H1_REGEX.captures(markup)?.get(1)?.as_str();
    let untagged = TAG_REGEX.replace_all(block, " ");
    let collapsed = WHITESPACE_REGEX.replace_all(&untagged, " ");
    non_empty(collapsed.trim()).map(decode_entities)
}

/// Counts word tokens in the visible text of a page
pub fn count_words(markup: &str) -> usize {
    let text = SCRIPT_REGEX.replace_all(markup, " ");
    let text = STYLE_REGEX.replace_all(&text, " ");
    let text = TAG_REGEX.replace_all(&text, " ");
    WORD_REGEX.find_iter(&text).count()
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
