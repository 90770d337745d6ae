//! URL handling module for Serp-Scout
//!
//! This module provides host normalization, brand derivation and the
//! parent-domain matching used by the deny-list.

mod domain;
mod matcher;

pub use domain::{domain_from_url, host_of, normalize_host};
pub use matcher::matches_parent_domain;

use crate::config::BrandSource;

/// Derives the display brand for a ranked link
///
/// With [`BrandSource::Provider`], a non-empty provider `source` label wins and
/// the URL's domain is the fallback. With [`BrandSource::Domain`], the label is
/// always taken from the URL.
///
/// # Examples
///
/// ```
/// use serp_scout::config::BrandSource;
/// use serp_scout::url::derive_brand;
///
/// let brand = derive_brand(BrandSource::Provider, "https://www.acme.com/", Some("Acme Plumbing"));
/// assert_eq!(brand, "Acme Plumbing");
///
/// let brand = derive_brand(BrandSource::Domain, "https://www.acme.com/", Some("Acme Plumbing"));
/// assert_eq!(brand, "acme.com");
/// ```
pub fn derive_brand(policy: BrandSource, link: &str, source: Option<&str>) -> String {
    match (policy, source.map(str::trim)) {
        (BrandSource::Provider, Some(label)) if !label.is_empty() => label.to_string(),
        _ => domain_from_url(link),
    }
}
