//! Render engine abstraction
//!
//! This module defines the port the crawl loop uses to load pages:
//! - `RenderEngine`: renders one URL at a time and reports text, links and requests
//! - `EngineLauncher`: creates one engine per crawl session
//! - The Chromium adapter (via chromiumoxide) and its helpers
//! - A scripted engine that replays canned pages

pub mod chromium;
mod dom;
mod idle;
pub mod scripted;

pub use chromium::{ChromiumEngine, ChromiumLauncher};
pub use dom::extract_links;
pub use idle::NetworkLog;
pub use scripted::{ScriptedEngine, ScriptedLauncher, ScriptedSite};

use crate::SiftError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Default per-page render ceiling
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Everything observed while rendering one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Body text after scripts have run
    pub text: String,

    /// Absolute http(s) anchor targets found in the rendered DOM
    pub links: Vec<String>,

    /// Full URLs of every network request issued while loading
    pub requests: Vec<String>,
}

/// A page that could not be rendered
///
/// Navigation errors, DNS or connection failures, timeouts and script
/// faults all collapse into this one kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Render failed for {url}: {reason}")]
pub struct RenderFailure {
    pub url: String,
    pub reason: String,
}

impl RenderFailure {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// A single browser context rendering pages for one crawl session
///
/// Calls are sequential: the session never has two renders in flight.
#[async_trait]
pub trait RenderEngine: Send {
    /// Loads `url`, waits for the page to settle and reports what it saw
    async fn render(&mut self, url: &str, timeout: Duration)
        -> Result<RenderedPage, RenderFailure>;

    /// Releases the underlying browser resources
    async fn close(self: Box<Self>);
}

/// Creates render engines, one per crawl session
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Starts a fresh engine
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, SiftError>;
}
