use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pagesift::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true if both URLs share the same host
///
/// Scheme and port are not compared: `http://x.com` and `https://x.com:8443`
/// are the same origin for crawl scoping.
pub fn is_same_origin(url: &Url, base: &Url) -> bool {
    match (extract_domain(url), extract_domain(base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
