use super::ScopePolicy;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sift::scope::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Hostname scope
///
/// A link is in scope iff both it and the seed parse as http(s) URLs with
/// the same host. Scheme, port, path and trailing slashes are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostScope;

impl ScopePolicy for HostScope {
    fn in_scope(&self, seed: &str, link: &str) -> bool {
        match (http_domain(seed), http_domain(link)) {
            (Some(seed_host), Some(link_host)) => seed_host == link_host,
            _ => false,
        }
    }
}

fn http_domain(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    extract_domain(&url)
}
