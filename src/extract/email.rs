//! Email token extraction from rendered page text

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Local part, `@`, dotted domain, final alphabetic label of 2+ characters.
/// Case-sensitive on purpose: matches are reported exactly as they appear.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern is valid")
});

/// Extracts the set of email-like tokens found in `text`
///
/// No lower-casing or trimming is applied, so `A@example.com` and
/// `a@example.com` are two distinct entries.
///
/// # Examples
///
/// ```
/// use sumi_sift::extract::extract_emails;
///
/// let found = extract_emails("contact me: a@example.com or a@example.com");
/// assert_eq!(found.len(), 1);
/// assert!(found.contains("a@example.com"));
/// ```
pub fn extract_emails(text: &str) -> HashSet<String> {
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Same matches as [`extract_emails`], deduplicated in order of first appearance
pub fn extract_emails_ordered(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|email| seen.insert(*email))
        .map(str::to_string)
        .collect()
}
