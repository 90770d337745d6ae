//! Browser identity profiles
//!
//! A profile is the set of outbound headers presented on a request. Two are
//! used: a Chrome-on-Windows persona for the first attempt and a
//! Safari-on-macOS persona, arriving from a search engine, for the single retry
//! after a block.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

pub const CHROME_WINDOWS_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

pub const SAFARI_MACOS_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_3) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/16.4 Safari/605.1.15";

/// Referrer presented by the retry identity
pub const SEARCH_ENGINE_REFERER: &str = "https://www.google.com/";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// A named set of request headers mimicking one browser
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    name: &'static str,
    headers: HeaderMap,
}

impl IdentityProfile {
    /// Chrome 114 on Windows, with client hints
    pub fn chrome_windows() -> Self {
        let mut headers = common_headers(CHROME_WINDOWS_UA);
        insert(
            &mut headers,
            "sec-ch-ua",
            r#""Chromium";v="114", "Not.A/Brand";v="24", "Google Chrome";v="114""#,
        );
        insert(&mut headers, "sec-ch-ua-mobile", "?0");
        insert(&mut headers, "sec-ch-ua-platform", r#""Windows""#);
        insert(&mut headers, "sec-fetch-site", "none");

        Self {
            name: "chrome-windows",
            headers,
        }
    }

    /// Safari 16 on macOS, referred from a search engine
    pub fn safari_macos() -> Self {
        let mut headers = common_headers(SAFARI_MACOS_UA);
        headers.insert(REFERER, HeaderValue::from_static(SEARCH_ENGINE_REFERER));
        insert(&mut headers, "sec-fetch-site", "cross-site");

        Self {
            name: "safari-macos",
            headers,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    pub fn referer(&self) -> Option<&str> {
        self.headers.get(REFERER).and_then(|v| v.to_str().ok())
    }
}

fn common_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    insert(&mut headers, "sec-fetch-mode", "navigate");
    insert(&mut headers, "sec-fetch-dest", "document");
    headers
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    );
}
