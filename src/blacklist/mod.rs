//! Deny-list of hosts that are never fetched
//!
//! Directory and listicle sites (review aggregators, social networks, ...) are
//! excluded from the competitor view. The list is a plain text file with one
//! hostname per line; `#` starts a comment line.
//!
//! Loading is fail-open: a missing or unreadable file yields an empty list and a
//! warning, never an error.

mod cache;

pub use cache::BlacklistCache;

use crate::url::{host_of, matches_parent_domain, normalize_host};
use std::collections::HashSet;
use std::path::Path;

/// An immutable set of denied hostnames
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: HashSet<String>,
}

impl Blacklist {
    /// Creates an empty deny-list
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a deny-list from the text format
    ///
    /// Lines are trimmed and lowercased; blank lines and `#` comments are
    /// skipped. A leading "www." on an entry is dropped so it compares against
    /// normalized hosts.
    ///
    /// # Examples
    ///
    /// ```
    /// use serp_scout::blacklist::Blacklist;
    ///
    /// let list = Blacklist::parse("# directories\nyelp.com\n\nAngi.com\n");
    /// assert_eq!(list.len(), 2);
    /// assert!(list.is_blacklisted("www.yelp.com"));
    /// ```
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(normalize_host)
            .collect();

        Self { entries }
    }

    /// Loads a deny-list from disk, falling back to an empty list on any error
    pub fn load_or_empty(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                tracing::info!(path = %path.display(), entries = list.len(), "Loaded blacklist");
                list
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load blacklist, continuing with none");
                Self::empty()
            }
        }
    }

    /// Returns true if the hostname is an entry or a subdomain of one
    ///
    /// The hostname is lowercased and stripped of a leading "www." first. An
    /// empty hostname is never blacklisted.
    pub fn is_blacklisted(&self, hostname: &str) -> bool {
        let Some(host) = normalize_host(hostname) else {
            return false;
        };

        self.entries
            .iter()
            .any(|entry| matches_parent_domain(entry, &host))
    }

    /// Returns true if the URL's host is blacklisted
    ///
    /// URLs without a parseable host are let through.
    pub fn is_url_blacklisted(&self, url: &str) -> bool {
        host_of(url).is_some_and(|host| self.is_blacklisted(&host))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<String> for Blacklist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().filter_map(|h| normalize_host(&h)).collect(),
        }
    }
}
