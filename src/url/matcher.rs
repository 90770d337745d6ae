/// Checks if a hostname falls under a deny-list entry
///
/// A hostname matches an entry when it is the entry itself or any subdomain of
/// it. Both sides are expected to be normalized already (see
/// [`normalize_host`](super::normalize_host)); the comparison is exact.
///
/// # Arguments
///
/// * `entry` - The deny-list hostname (e.g. "reddit.com")
/// * `candidate` - The normalized hostname to check
///
/// # Examples
///
/// ```
/// use serp_scout::url::matches_parent_domain;
///
/// assert!(matches_parent_domain("reddit.com", "reddit.com"));
/// assert!(matches_parent_domain("reddit.com", "old.reddit.com"));
/// assert!(!matches_parent_domain("reddit.com", "notreddit.com"));
/// ```
pub fn matches_parent_domain(entry: &str, candidate: &str) -> bool {
    if entry.is_empty() {
        return false;
    }

    match candidate.strip_suffix(entry) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}
