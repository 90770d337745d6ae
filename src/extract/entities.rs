//! Character reference decoding for extracted text

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ENTITY_REGEX: Regex =
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex");
}

/// Decodes numeric character references and the common named entities
///
/// Handles `&#NNN;`, `&#xHH;`, `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;` and
/// `&nbsp;` (as a plain space). Unknown names and references to invalid code
/// points are left as written.
///
/// # Examples
///
/// ```
/// use serp_scout::extract::decode_entities;
///
/// assert_eq!(decode_entities("A &amp; B"), "A & B");
/// assert_eq!(decode_entities("&#65;&#x42;"), "AB");
/// assert_eq!(decode_entities("&copy; 2024"), "&copy; 2024");
/// ```
pub fn decode_entities(input: &str) -> String {
    ENTITY_REGEX
        .replace_all(input, |caps: &Captures| {
            let whole = &caps[0];
            let body = &caps[1];
            decode_one(body).map_or_else(|| whole.to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn decode_one(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    match body.to_ascii_lowercase().as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}
