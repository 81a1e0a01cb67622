//! Session-scoped crawl state
//!
//! One `CrawlSession` holds everything a single crawl mutates: the frontier,
//! the visited set, and the email and tracker sets. It is created when a
//! crawl starts and dropped when the coordinator returns.

use crate::crawler::frontier::Frontier;
use crate::extract::{extract_emails_ordered, TrackerClassifier};
use crate::render::{RenderFailure, RenderedPage};
use crate::scope::ScopePolicy;
use crate::state::SessionState;
use crate::{validate_seed_url, SiftError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Final output of one crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Distinct email tokens, in order of first discovery
    pub emails: Vec<String>,

    /// Distinct tracker request URLs, in order of first discovery
    pub trackers: Vec<String>,
}

/// Insertion-ordered set of strings that only ever grows
#[derive(Debug, Default)]
struct DiscoverySet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl DiscoverySet {
    fn insert(&mut self, item: &str) -> bool {
        if self.seen.contains(item) {
            return false;
        }
        self.seen.insert(item.to_string());
        self.items.push(item.to_string());
        true
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }
}

/// What one successful page contributed to the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageYield {
    pub new_emails: usize,
    pub new_trackers: usize,
    pub enqueued: usize,
}

/// All mutable state of one crawl invocation
#[derive(Debug)]
pub struct CrawlSession {
    seed_url: String,
    page_budget: usize,
    state: SessionState,
    frontier: Frontier,
    emails: DiscoverySet,
    trackers: DiscoverySet,
    failures: Vec<RenderFailure>,
}

impl CrawlSession {
    /// Creates a session in the `Init` state
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Seed and budget are usable
    /// * `Err(SiftError::InvalidInput)` - Seed does not start with `http` or budget is zero
    pub fn new(seed_url: &str, page_budget: usize) -> Result<Self, SiftError> {
        validate_seed_url(seed_url)?;
        if page_budget == 0 {
            return Err(SiftError::InvalidInput(
                "page budget must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            seed_url: seed_url.to_string(),
            page_budget,
            state: SessionState::Init,
            frontier: Frontier::new(),
            emails: DiscoverySet::default(),
            trackers: DiscoverySet::default(),
            failures: Vec::new(),
        })
    }

    /// Seeds the frontier and enters `Running`
    pub fn start(&mut self) -> Result<(), SiftError> {
        self.state.transition(SessionState::Running)?;
        let seed = self.seed_url.clone();
        self.frontier.enqueue(&seed);
        Ok(())
    }

    /// Loop condition: work is queued and the budget is not spent
    pub fn should_continue(&self) -> bool {
        self.state == SessionState::Running
            && !self.frontier.is_empty()
            && self.frontier.visited_count() < self.page_budget
    }

    /// Pops the next URL that still needs rendering
    ///
    /// Already-visited entries are skipped without touching the budget.
    pub fn next_url(&mut self) -> Option<String> {
        while let Some(url) = self.frontier.dequeue() {
            if self.frontier.is_visited(&url) {
                tracing::debug!("Skipping already visited {}", url);
                continue;
            }
            return Some(url);
        }
        None
    }

    /// Folds a successful render into the session
    ///
    /// Marks `url` visited, unions its emails and tracker requests, and
    /// enqueues every in-scope link that has not been visited.
    pub fn absorb_page(
        &mut self,
        url: &str,
        page: &RenderedPage,
        classifier: &TrackerClassifier,
        scope: &dyn ScopePolicy,
    ) -> PageYield {
        self.frontier.mark_visited(url);

        let mut outcome = PageYield::default();

        for email in extract_emails_ordered(&page.text) {
            if self.emails.insert(&email) {
                outcome.new_emails += 1;
            }
        }

        for request in page.requests.iter().filter(|r| classifier.classify(r)) {
            if self.trackers.insert(request) {
                outcome.new_trackers += 1;
            }
        }

        for link in &page.links {
            if !scope.in_scope(&self.seed_url, link) {
                tracing::trace!("Out of scope: {}", link);
                continue;
            }
            if self.frontier.is_visited(link) {
                continue;
            }
            if self.frontier.enqueue(link) {
                tracing::debug!("Enqueued {}", link);
                outcome.enqueued += 1;
            }
        }

        outcome
    }

    /// Records a failed render; the URL stays unvisited
    pub fn record_failure(&mut self, failure: RenderFailure) {
        self.failures.push(failure);
    }

    /// Leaves `Running` for `Done`
    pub fn finish(&mut self) -> Result<(), SiftError> {
        self.state.transition(SessionState::Done)
    }

    /// Snapshot of the emails and trackers collected so far
    pub fn result(&self) -> CrawlResult {
        CrawlResult {
            emails: self.emails.to_vec(),
            trackers: self.trackers.to_vec(),
        }
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn page_budget(&self) -> usize {
        self.page_budget
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn failures(&self) -> &[RenderFailure] {
        &self.failures
    }

    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }
}
