//! Crawl scope policies
//!
//! A scope policy decides whether a link discovered on a page belongs to the
//! site being crawled. The orchestrator only talks to the [`ScopePolicy`]
//! trait, so a stricter policy can be swapped in without touching the loop.

mod host;

pub use host::{extract_domain, HostScope};

use crate::config::ScopeKind;

/// Decides whether a discovered link is part of the crawl
pub trait ScopePolicy: Send + Sync {
    /// Returns true if `link` may be enqueued for a crawl seeded at `seed`
    fn in_scope(&self, seed: &str, link: &str) -> bool;
}

/// Literal string-prefix scope
///
/// A link is in scope iff it starts with the exact seed string. This is a
/// rough stand-in for "same site": `https://example.com` also admits
/// `https://example.com2.net/`, and rejects `http://example.com/about`.
/// A seed of `https://example.com/` rejects the bare `https://example.com`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixScope;

impl ScopePolicy for PrefixScope {
    fn in_scope(&self, seed: &str, link: &str) -> bool {
        link.starts_with(seed)
    }
}

/// Builds the scope policy selected in the configuration
pub fn scope_for(kind: ScopeKind) -> Box<dyn ScopePolicy> {
    match kind {
        ScopeKind::Prefix => Box::new(PrefixScope),
        ScopeKind::Host => Box::new(HostScope),
    }
}
