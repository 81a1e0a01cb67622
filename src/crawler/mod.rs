//! Crawler module for rendering and harvesting one site
//!
//! This module contains the core crawling logic, including:
//! - Frontier and visited-set bookkeeping
//! - Session state (emails, trackers, failures)
//! - The sequential render loop
//! - Session concurrency limiting

mod coordinator;
mod frontier;
mod limiter;
mod session;

pub use coordinator::{Coordinator, CrawlOptions, CrawlReport};
pub use frontier::Frontier;
pub use limiter::SessionLimiter;
pub use session::{CrawlResult, CrawlSession, PageYield};

use crate::render::EngineLauncher;
use crate::SiftError;

/// Pages rendered per crawl when the caller gives no budget
pub const DEFAULT_PAGE_BUDGET: usize = 5;

/// Runs a complete crawl session
///
/// This is the main entry point for crawling one site. It will:
/// 1. Validate the seed and budget
/// 2. Launch a fresh render engine
/// 3. Render pages breadth-first until the budget or frontier runs out
/// 4. Close the engine
///
/// Individual page failures never abort the session.
///
/// # Arguments
///
/// * `launcher` - Creates the session's render engine
/// * `seed_url` - Starting URL; also the literal scope prefix
/// * `page_budget` - Maximum number of successfully rendered pages
/// * `options` - Render timeout, tracker patterns and scope policy
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Distinct emails and tracker URLs found
/// * `Err(SiftError)` - Invalid input or the engine could not be launched
pub async fn crawl_site(
    launcher: &dyn EngineLauncher,
    seed_url: &str,
    page_budget: usize,
    options: &CrawlOptions,
) -> Result<CrawlResult, SiftError> {
    let report = crawl_site_report(launcher, seed_url, page_budget, options).await?;
    Ok(report.result)
}

/// Like [`crawl_site`], but also returns visited URLs and failures
pub async fn crawl_site_report(
    launcher: &dyn EngineLauncher,
    seed_url: &str,
    page_budget: usize,
    options: &CrawlOptions,
) -> Result<CrawlReport, SiftError> {
    let session = CrawlSession::new(seed_url, page_budget)?;
    let engine = launcher.launch().await?;
    Coordinator::new(engine, session, options).run().await
}
