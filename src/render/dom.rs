//! Link extraction from rendered DOM snapshots
//!
//! The browser hands back the serialized post-script DOM; anchors are pulled
//! out here and resolved the way `HTMLAnchorElement.href` resolves them.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all http(s) anchor targets from a rendered document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, resolved against the
///   document's `<base href>` if present, otherwise against `page_url`
///
/// **Exclude:**
/// - Targets that do not resolve to `http` or `https` (`mailto:`,
///   `javascript:`, `tel:`, data URIs...)
/// - Hrefs that fail to resolve at all
///
/// Order of appearance is kept and duplicates are not removed; the frontier
/// suppresses repeats.
///
/// # Example
///
/// ```
/// use sumi_sift::render::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><a href="mailto:a@example.com">Mail</a>"#;
/// let page = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &page), vec!["https://example.com/about"]);
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);

    let mut links = Vec::new();
    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, &base) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves the effective base URL from the first `<base href>`
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a link href to an absolute URL, keeping only http(s) results
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let resolved = base_url.join(href.trim()).ok()?;

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
