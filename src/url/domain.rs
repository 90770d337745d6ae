use url::Url;

/// Normalizes a hostname for deny-list comparison
///
/// Lowercases the host and strips a single leading "www.". Returns `None` for
/// an empty host.
///
/// # Examples
///
/// ```
/// use serp_scout::url::normalize_host;
///
/// assert_eq!(normalize_host("WWW.Example.COM"), Some("example.com".to_string()));
/// assert_eq!(normalize_host("blog.example.com"), Some("blog.example.com".to_string()));
/// assert_eq!(normalize_host("  "), None);
/// ```
pub fn normalize_host(host: &str) -> Option<String> {
    let lower = host.trim().to_lowercase();
    let stripped = lower.strip_prefix("www.").unwrap_or(&lower);
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Extracts the normalized host from a URL string
///
/// Returns `None` when the string is not an absolute URL with a host.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().and_then(normalize_host))
}

/// Derives a display label from a URL: its host without "www."
///
/// When the URL does not parse, the raw string is returned unchanged so a row
/// always has some label.
///
/// # Examples
///
/// ```
/// use serp_scout::url::domain_from_url;
///
/// assert_eq!(domain_from_url("https://www.bendplumbing.com/about"), "bendplumbing.com");
/// assert_eq!(domain_from_url("not a url"), "not a url");
/// ```
pub fn domain_from_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}
