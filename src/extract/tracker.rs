//! Tracker request classification

use crate::config::default_tracker_patterns;

/// Classifies request URLs as tracking requests by substring match
///
/// Matching is coarse: a request is a tracker if its URL contains any
/// configured pattern anywhere, so `https://example.com/google-maps.js`
/// counts as a Google tracker. That false positive is accepted.
#[derive(Debug, Clone)]
pub struct TrackerClassifier {
    patterns: Vec<String>,
}

impl TrackerClassifier {
    /// Creates a classifier from a list of substrings
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Returns true if `request_url` contains any configured substring
    pub fn classify(&self, request_url: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| request_url.contains(pattern.as_str()))
    }

    /// Returns the configured patterns
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for TrackerClassifier {
    fn default() -> Self {
        Self::new(default_tracker_patterns())
    }
}
