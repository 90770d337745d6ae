//! Bot-defense detection
//!
//! A response counts as blocked when its status is 403/406 or its body carries
//! a known challenge page or WAF vendor string.

use crate::state::BlockReason;
use lazy_static::lazy_static;
use regex::{Regex, RegexSet};

/// Vendor and challenge strings, matched case-insensitively
pub const BLOCK_SIGNATURES: &[&str] = &[
    "Access Denied",
    "Request unsuccessful",
    "Akamai",
    "Incapsula",
    "Cloudflare",
    "Please enable cookies",
];

/// Strings matched exactly as written
pub const EXACT_BLOCK_SIGNATURES: &[&str] = &["Mod_Security", "Not Acceptable!"];

lazy_static! {
    static ref NOT_ACCEPTABLE_TITLE: Regex =
        Regex::new(r"(?i)<title[^>]*>\s*Not Acceptable!\s*</title>").expect("valid title regex");
    static ref SIGNATURE_SET: RegexSet = RegexSet::new(
        BLOCK_SIGNATURES
            .iter()
            .map(|sig| format!("(?i){}", regex::escape(sig)))
    )
    .expect("valid signature set");
}

/// Returns why a response looks like a bot-defense page, if it does
///
/// # Examples
///
/// ```
/// use serp_scout::crawler::detect_block;
///
/// assert!(detect_block(403, "").is_some());
/// assert!(detect_block(200, "<p>Powered by Incapsula</p>").is_some());
/// assert!(detect_block(200, "<title>Bend Plumbing</title>").is_none());
/// ```
pub fn detect_block(status: u16, body: &str) -> Option<BlockReason> {
    if status == 403 || status == 406 {
        return Some(BlockReason::Status(status));
    }

    if NOT_ACCEPTABLE_TITLE.is_match(body) {
        return Some(BlockReason::NotAcceptablePage);
    }

    if let Some(index) = SIGNATURE_SET.matches(body).iter().next() {
        return Some(BlockReason::Signature(BLOCK_SIGNATURES[index].to_string()));
    }

    EXACT_BLOCK_SIGNATURES
        .iter()
        .find(|sig| body.contains(*sig))
        .map(|sig| BlockReason::Signature(sig.to_string()))
}
