//! Per-page extraction
//!
//! This module contains the two pure extractors run on every rendered page:
//! - Email tokens pulled from the page text
//! - Tracker classification of the page's network requests

mod email;
mod tracker;

pub use email::{extract_emails, extract_emails_ordered};
pub use tracker::TrackerClassifier;
