//! Anchor link discovery
//!
//! Parses markup for `<a href>` elements, resolves every href against the
//! page URL and keeps only same-origin http(s) links. Each link is returned
//! twice: as the normalized key that deduplicates it and as the resolved
//! target that actually gets fetched.

use crate::url::{is_same_origin, normalize_url, resolve_url, validate_url};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Extracts the set of same-origin links from a page
///
/// **Excluded:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - fragment-only anchors (`#section`)
/// - anchors carrying a `download` attribute
/// - links failing [`validate_url`] or pointing at another host
///
/// The result maps each normalized URL to the resolved URL (fragment removed)
/// of its first occurrence in the document. Iteration follows the
/// lexicographic order of the normalized keys, not document order.
///
/// # Example
///
/// ```
/// use pagesift::url::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://x.com/docs/").unwrap();
/// let html = r#"<a href="intro/">I</a><a href="https://other.com/c">C</a>"#;
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
///
/// let key = Url::parse("https://x.com/docs/intro").unwrap();
/// assert_eq!(links[&key].as_str(), "https://x.com/docs/intro/");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> BTreeMap<Url, Url> {
    let document = Html::parse_document(html);
    let mut links = BTreeMap::new();

    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            tracing::warn!("Anchor selector failed to parse: {:?}", e);
            return links;
        }
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some((key, target)) = accept_link(href, base_url) {
            links.entry(key).or_insert(target);
        }
    }

    links
}

/// Resolves, validates and scopes a single href into `(key, target)`
fn accept_link(href: &str, base_url: &Url) -> Option<(Url, Url)> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = resolve_url(href, base_url)?;
    absolute.set_fragment(None);
    if !validate_url(absolute.as_str()) || !is_same_origin(&absolute, base_url) {
        return None;
    }

    match normalize_url(absolute.as_str()) {
        Ok(normalized) => Some((normalized, absolute)),
        Err(e) => {
            tracing::debug!("Dropping link {}: {}", absolute, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page").unwrap()
    }

    fn links_of(html: &str) -> Vec<String> {
        extract_links(html, &base_url())
            .into_keys()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_cross_origin_link_dropped() {
        let base = Url::parse("https://x.com/a").unwrap();
        let html = r#"<html><body>
            <a href="/b">B</a>
            <a href="https://other.com/c">C</a>
        </body></html>"#;
        let links: Vec<String> = extract_links(html, &base)
            .into_keys()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(links, vec!["https://x.com/b".to_string()]);
    }

    #[test]
    fn test_relative_path_link() {
        let links = links_of(r#"<a href="other">Link</a>"#);
        assert_eq!(links, vec!["https://example.com/docs/other".to_string()]);
    }

    #[test]
    fn test_relative_link_under_directory_base() {
        let base = Url::parse("https://example.com/docs/").unwrap();
        let links = extract_links(r#"<a href="intro">Intro</a><a href="guide/">Guide</a>"#, &base);
        let pairs: Vec<(String, String)> = links
            .into_iter()
            .map(|(key, target)| (key.to_string(), target.to_string()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                (
                    "https://example.com/docs/guide".to_string(),
                    "https://example.com/docs/guide/".to_string()
                ),
                (
                    "https://example.com/docs/intro".to_string(),
                    "https://example.com/docs/intro".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_first_occurrence_is_the_target() {
        let links = extract_links(
            r#"<a href="/a/#x">1</a><a href="/a">2</a>"#,
            &base_url(),
        );
        let key = Url::parse("https://example.com/a").unwrap();
        assert_eq!(links[&key].as_str(), "https://example.com/a/");
    }

    #[test]
    fn test_parent_relative_link() {
        let links = links_of(r#"<a href="../top">Link</a>"#);
        assert_eq!(links, vec!["https://example.com/top".to_string()]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let links = links_of(
            r#"<a href="/a">1</a><a href="/a/">2</a><a href="/a#frag">3</a><a href="https://example.com/a">4</a>"#,
        );
        assert_eq!(links, vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn test_special_schemes_skipped() {
        let html = r#"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">call</a>
            <a href="data:text/html,<h1>x</h1>">data</a>
            <a href="ftp://example.com/file">ftp</a>
        "#;
        assert!(links_of(html).is_empty());
    }

    #[test]
    fn test_fragment_only_and_download_skipped() {
        let html = r##"<a href="#section">Jump</a><a href="/file.pdf" download>Get</a>"##;
        assert!(links_of(html).is_empty());
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        assert!(links_of(r#"<a name="top">Top</a>"#).is_empty());
    }

    #[test]
    fn test_overlong_link_rejected() {
        let long_path = "a".repeat(2100);
        let html = format!(r#"<a href="/{long_path}">long</a>"#);
        assert!(links_of(&html).is_empty());
    }

    #[test]
    fn test_malformed_markup_still_yields_links() {
        let links = links_of(r#"<div><a href="/ok">unclosed <p>text"#);
        assert_eq!(links, vec!["https://example.com/ok".to_string()]);
    }
}
