//! Bounds how many crawl sessions run at the same time
//!
//! Each session owns a whole browser, so the limiter hands out one permit
//! per session and holds it until the session's engine has been closed.
//! Callers beyond the limit wait for a permit instead of failing.

use crate::crawler::{crawl_site, CrawlOptions, CrawlResult};
use crate::render::EngineLauncher;
use crate::SiftError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs crawl sessions through a shared launcher, at most `max_sessions` at once
pub struct SessionLimiter {
    /// Global semaphore, one permit per live session
    semaphore: Arc<Semaphore>,

    launcher: Arc<dyn EngineLauncher>,

    options: CrawlOptions,
}

impl SessionLimiter {
    /// Creates a limiter
    ///
    /// # Arguments
    ///
    /// * `launcher` - Source of one render engine per session
    /// * `options` - Render timeout, tracker patterns and scope for every session
    /// * `max_sessions` - Concurrent session ceiling (clamped to at least 1)
    pub fn new(
        launcher: Arc<dyn EngineLauncher>,
        options: CrawlOptions,
        max_sessions: usize,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_sessions.max(1))),
            launcher,
            options,
        }
    }

    /// Crawls `seed_url` once a session slot is free
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Session completed
    /// * `Err(SiftError::InvalidInput)` - Seed or budget rejected before waiting
    /// * `Err(SiftError::Launch)` - No engine could be started
    /// * `Err(SiftError::Limiter)` - The limiter was shut down
    pub async fn crawl(&self, seed_url: &str, page_budget: usize) -> Result<CrawlResult, SiftError> {
        crate::validate_seed_url(seed_url)?;

        let _permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| SiftError::Limiter(format!("session limiter closed: {e}")))?;
        tracing::debug!(
            "Session slot acquired for {} ({} free)",
            seed_url,
            self.semaphore.available_permits()
        );

        crawl_site(self.launcher.as_ref(), seed_url, page_budget, &self.options).await
    }

    /// Session slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Stops handing out slots; waiting and future crawls fail with `Limiter`
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }
}
