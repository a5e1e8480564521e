//! URL policy for PageSift
//!
//! This module decides which URLs a crawl may touch: validation, link
//! resolution, same-origin scoping, normalization and anchor discovery.

mod domain;
mod links;
mod normalize;

pub use domain::{extract_domain, is_same_origin};
pub use links::extract_links;
pub use normalize::normalize_url;

use url::Url;

/// URLs must be strictly shorter than this many characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Returns true if the string is a crawlable URL
///
/// A crawlable URL uses the http or https scheme, has a non-empty host and is
/// shorter than [`MAX_URL_LENGTH`] characters.
///
/// # Examples
///
/// ```
/// use pagesift::url::validate_url;
///
/// assert!(validate_url("https://example.com/page"));
/// assert!(!validate_url("ftp://example.com/file"));
/// assert!(!validate_url("https:///no-host"));
/// ```
pub fn validate_url(url: &str) -> bool {
    if url.chars().count() >= MAX_URL_LENGTH {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Resolves an href against the page it was found on
///
/// Absolute URLs pass through, root-relative hrefs (`/path`) are joined to the
/// origin of `base`, and every other relative form follows standard URL
/// joining. Returns `None` when the href cannot be resolved.
///
/// # Examples
///
/// ```
/// use pagesift::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(resolve_url("/b", &base).unwrap().as_str(), "https://example.com/b");
/// assert_eq!(resolve_url("next", &base).unwrap().as_str(), "https://example.com/docs/next");
/// ```
pub fn resolve_url(href: &str, base: &Url) -> Option<Url> {
    base.join(href.trim()).ok()
}
