//! In-memory render engine that replays canned pages
//!
//! Used wherever a real browser is unwanted: unit and integration tests,
//! and offline replays of a known site. A `ScriptedSite` maps URLs to
//! pages or failures; every engine launched from it shares the same
//! script and call log.

use super::{EngineLauncher, RenderEngine, RenderFailure, RenderedPage};
use crate::SiftError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Page(RenderedPage),
    Fail(String),
    /// Fails `remaining` more times, then serves the page
    Flaky {
        remaining: usize,
        page: RenderedPage,
    },
}

#[derive(Debug, Default)]
struct SiteState {
    scripts: HashMap<String, Script>,
    calls: Vec<String>,
}

/// A fake site shared by every engine its launcher produces
#[derive(Debug, Default)]
pub struct ScriptedSite {
    state: Mutex<SiteState>,
    render_delay: Mutex<Option<Duration>>,
    launches: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
    closed: AtomicUsize,
    refuse_launch: AtomicBool,
}

impl ScriptedSite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serves `page` for `url`
    pub fn page(&self, url: &str, page: RenderedPage) -> &Self {
        self.lock().scripts.insert(url.to_string(), Script::Page(page));
        self
    }

    /// Fails every render of `url` with `reason`
    pub fn fail(&self, url: &str, reason: &str) -> &Self {
        self.lock()
            .scripts
            .insert(url.to_string(), Script::Fail(reason.to_string()));
        self
    }

    /// Fails the first `failures` renders of `url`, then serves `page`
    pub fn flaky(&self, url: &str, failures: usize, page: RenderedPage) -> &Self {
        self.lock().scripts.insert(
            url.to_string(),
            Script::Flaky {
                remaining: failures,
                page,
            },
        );
        self
    }

    /// Makes every render sleep before answering
    pub fn set_render_delay(&self, delay: Duration) {
        *self
            .render_delay
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(delay);
    }

    /// Makes the launcher fail as if no browser were installed
    pub fn refuse_launch(&self) {
        self.refuse_launch.store(true, Ordering::SeqCst);
    }

    /// Every URL passed to `render`, in call order, across all engines
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Engines launched and not yet closed
    pub fn live_engines(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Most engines ever alive at the same time
    pub fn peak_live_engines(&self) -> usize {
        self.peak_live.load(Ordering::SeqCst)
    }

    pub fn closed_engines(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn delay(&self) -> Option<Duration> {
        *self
            .render_delay
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn answer(&self, url: &str) -> Result<RenderedPage, RenderFailure> {
        let mut state = self.lock();
        state.calls.push(url.to_string());

        match state.scripts.get_mut(url) {
            Some(Script::Page(page)) => Ok(page.clone()),
            Some(Script::Fail(reason)) => Err(RenderFailure::new(url, reason.clone())),
            Some(Script::Flaky { remaining, page }) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    Err(RenderFailure::new(url, "connection reset"))
                } else {
                    Ok(page.clone())
                }
            }
            None => Err(RenderFailure::new(url, "net::ERR_NAME_NOT_RESOLVED")),
        }
    }
}

/// Launcher handing out engines bound to one `ScriptedSite`
#[derive(Debug, Clone)]
pub struct ScriptedLauncher {
    site: Arc<ScriptedSite>,
}

impl ScriptedLauncher {
    pub fn new(site: Arc<ScriptedSite>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl EngineLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, SiftError> {
        if self.site.refuse_launch.load(Ordering::SeqCst) {
            return Err(SiftError::Launch("no browser available".to_string()));
        }

        self.site.launches.fetch_add(1, Ordering::SeqCst);
        let live = self.site.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.site.peak_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(ScriptedEngine {
            site: Arc::clone(&self.site),
        }))
    }
}

/// Engine answering from a `ScriptedSite`
#[derive(Debug)]
pub struct ScriptedEngine {
    site: Arc<ScriptedSite>,
}

#[async_trait]
impl RenderEngine for ScriptedEngine {
    async fn render(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<RenderedPage, RenderFailure> {
        if let Some(delay) = self.site.delay() {
            if delay >= timeout {
                tokio::time::sleep(timeout).await;
                return Err(RenderFailure::new(
                    url,
                    format!("timed out after {}ms", timeout.as_millis()),
                ));
            }
            tokio::time::sleep(delay).await;
        }
        self.site.answer(url)
    }

    async fn close(self: Box<Self>) {
        self.site.live.fetch_sub(1, Ordering::SeqCst);
        self.site.closed.fetch_add(1, Ordering::SeqCst);
    }
}
