//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives one session:
//! - Pulling URLs from the frontier in FIFO order
//! - Rendering each page through the render engine, one at a time
//! - Feeding text and requests to the extractors
//! - Enqueueing in-scope links until the page budget is spent
//! - Releasing the render engine when the session is done

use crate::config::ScopeKind;
use crate::crawler::session::{CrawlResult, CrawlSession};
use crate::extract::TrackerClassifier;
use crate::render::{RenderEngine, RenderFailure, DEFAULT_RENDER_TIMEOUT};
use crate::scope::{scope_for, ScopePolicy};
use crate::state::SessionState;
use crate::{Config, SiftError};
use std::time::{Duration, Instant};

/// Per-session settings shared by every crawl started from one configuration
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Ceiling for a single page render
    pub render_timeout: Duration,

    /// Tracker substrings
    pub classifier: TrackerClassifier,

    /// Scope policy selection
    pub scope: ScopeKind,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            classifier: TrackerClassifier::default(),
            scope: ScopeKind::Prefix,
        }
    }
}

impl CrawlOptions {
    /// Builds options from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            render_timeout: Duration::from_millis(config.crawler.render_timeout_ms),
            classifier: TrackerClassifier::new(config.trackers.patterns.clone()),
            scope: config.crawler.scope,
        }
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Emails and trackers
    pub result: CrawlResult,

    /// Successfully rendered URLs, in render order
    pub visited: Vec<String>,

    /// Renders that failed, in order
    pub failures: Vec<RenderFailure>,

    /// Final session state (always `Done` for a completed run)
    pub state: SessionState,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    engine: Box<dyn RenderEngine>,
    session: CrawlSession,
    classifier: TrackerClassifier,
    scope: Box<dyn ScopePolicy>,
    render_timeout: Duration,
}

impl Coordinator {
    /// Creates a coordinator owning `engine` for the lifetime of `session`
    pub fn new(
        engine: Box<dyn RenderEngine>,
        session: CrawlSession,
        options: &CrawlOptions,
    ) -> Self {
        Self::with_scope(engine, session, options, scope_for(options.scope))
    }

    /// Creates a coordinator with an explicit scope policy
    pub fn with_scope(
        engine: Box<dyn RenderEngine>,
        session: CrawlSession,
        options: &CrawlOptions,
        scope: Box<dyn ScopePolicy>,
    ) -> Self {
        Self {
            engine,
            session,
            classifier: options.classifier.clone(),
            scope,
            render_timeout: options.render_timeout,
        }
    }

    /// Runs the session to completion and releases the engine
    ///
    /// The engine is closed on every path out of the loop, including a
    /// rejected state transition.
    pub async fn run(mut self) -> Result<CrawlReport, SiftError> {
        let outcome = self.traverse().await;
        self.engine.close().await;
        outcome?;

        Ok(CrawlReport {
            result: self.session.result(),
            visited: self.session.frontier().visited().to_vec(),
            failures: self.session.failures().to_vec(),
            state: self.session.state(),
        })
    }

    /// The crawl loop proper
    ///
    /// 1. Dequeue the next unvisited URL
    /// 2. Render it (the only suspension point)
    /// 3. On success fold text, requests and links into the session
    /// 4. On failure log it and move on; the URL stays unvisited
    async fn traverse(&mut self) -> Result<(), SiftError> {
        let start_time = Instant::now();
        self.session.start()?;
        tracing::info!(
            "Starting crawl of {} (budget {} pages)",
            self.session.seed_url(),
            self.session.page_budget()
        );

        while self.session.should_continue() {
            let url = match self.session.next_url() {
                Some(url) => url,
                None => break,
            };

            tracing::info!("Crawling: {}", url);
            match self.engine.render(&url, self.render_timeout).await {
                Ok(page) => {
                    let outcome = self.session.absorb_page(
                        &url,
                        &page,
                        &self.classifier,
                        self.scope.as_ref(),
                    );
                    tracing::debug!(
                        "{}: {} new emails, {} new trackers, {} links queued",
                        url,
                        outcome.new_emails,
                        outcome.new_trackers,
                        outcome.enqueued
                    );
                }
                Err(failure) => {
                    tracing::warn!("{}", failure);
                    self.session.record_failure(failure);
                }
            }
        }

        self.session.finish()?;
        tracing::info!(
            "Crawl of {} completed: {} pages rendered, {} failed, {} emails, {} trackers in {:?}",
            self.session.seed_url(),
            self.session.frontier().visited_count(),
            self.session.failures().len(),
            self.session.email_count(),
            self.session.tracker_count(),
            start_time.elapsed()
        );

        Ok(())
    }
}
