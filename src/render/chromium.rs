//! Chromium-based render engine using chromiumoxide.

use super::{extract_links, EngineLauncher, NetworkLog, RenderEngine, RenderFailure, RenderedPage};
use crate::config::RendererConfig;
use crate::SiftError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

/// How often the idle detector re-checks the network log
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";
const OUTER_HTML_JS: &str = "document.documentElement ? document.documentElement.outerHTML : ''";

/// Launches one headless Chromium per crawl session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: RendererConfig,
}

impl ChromiumLauncher {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, SiftError> {
        let engine = ChromiumEngine::launch(&self.config).await?;
        Ok(Box::new(engine))
    }
}

/// A headless browser with a single page, observing every request the page issues
///
/// Requests are only listened to, never intercepted, so nothing the page
/// loads is blocked. Dropping the engine kills the browser process.
pub struct ChromiumEngine {
    browser: Browser,
    page: Page,
    network: Arc<Mutex<NetworkLog>>,
    idle_window: Duration,
    handler_task: JoinHandle<()>,
    listener_task: JoinHandle<()>,
}

impl ChromiumEngine {
    /// Launches Chromium, opens a blank page and starts the network listeners
    pub async fn launch(config: &RendererConfig) -> Result<Self, SiftError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        let browser_config = builder
            .build()
            .map_err(|e| SiftError::Launch(format!("invalid browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SiftError::Launch(format!("failed to launch Chromium: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let network = Arc::new(Mutex::new(NetworkLog::new(config.idle_connections)));
        let (page, listener_task) = match open_page(&browser, Arc::clone(&network)).await {
            Ok(opened) => opened,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        tracing::debug!("Chromium render engine ready");

        Ok(Self {
            browser,
            page,
            network,
            idle_window: Duration::from_millis(config.idle_window_ms),
            handler_task,
            listener_task,
        })
    }

    /// Navigates and collects text and links once the network has settled
    async fn load(&self, url: &str) -> Result<(String, Vec<String>), String> {
        self.page
            .goto(url)
            .await
            .map_err(|e| format!("navigation failed: {e}"))?;

        self.wait_for_network_idle().await;

        let text: String = self
            .page
            .evaluate(BODY_TEXT_JS)
            .await
            .map_err(|e| format!("reading page text failed: {e}"))?
            .into_value()
            .map_err(|e| format!("page text was not a string: {e:?}"))?;

        let html: String = self
            .page
            .evaluate(OUTER_HTML_JS)
            .await
            .map_err(|e| format!("reading page DOM failed: {e}"))?
            .into_value()
            .map_err(|e| format!("page DOM was not a string: {e:?}"))?;

        let current = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());
        let base = Url::parse(&current).map_err(|e| format!("bad page URL {current}: {e}"))?;

        Ok((text, extract_links(&html, &base)))
    }

    async fn wait_for_network_idle(&self) {
        loop {
            if lock_log(&self.network).is_settled(self.idle_window, Instant::now()) {
                return;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn render(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<RenderedPage, RenderFailure> {
        lock_log(&self.network).reset(Instant::now());

        match tokio::time::timeout(timeout, self.load(url)).await {
            Ok(Ok((text, links))) => {
                let requests = lock_log(&self.network).take_requests();
                Ok(RenderedPage {
                    text,
                    links,
                    requests,
                })
            }
            Ok(Err(reason)) => Err(RenderFailure::new(url, reason)),
            Err(_) => Err(RenderFailure::new(
                url,
                format!("timed out after {}ms", timeout.as_millis()),
            )),
        }
    }

    async fn close(mut self: Box<Self>) {
        self.listener_task.abort();
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close Chromium cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for Chromium to exit failed: {}", e);
        }
        self.handler_task.abort();
        tracing::debug!("Chromium render engine closed");
    }
}

/// Opens the session's page and wires its network events into `network`
async fn open_page(
    browser: &Browser,
    network: Arc<Mutex<NetworkLog>>,
) -> Result<(Page, JoinHandle<()>), SiftError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| SiftError::Launch(format!("failed to create page: {e}")))?;

    let listen_err = |e: chromiumoxide::error::CdpError| {
        SiftError::Launch(format!("failed to subscribe to network events: {e}"))
    };
    let mut started = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(listen_err)?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(listen_err)?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(listen_err)?;

    let listener_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(event) = started.next() => {
                    lock_log(&network).request_started(event.request_id.inner(), &event.request.url);
                }
                Some(event) = finished.next() => {
                    lock_log(&network).request_finished(event.request_id.inner(), Instant::now());
                }
                Some(event) = failed.next() => {
                    lock_log(&network).request_finished(event.request_id.inner(), Instant::now());
                }
                else => break,
            }
        }
    });

    Ok((page, listener_task))
}

fn lock_log(network: &Mutex<NetworkLog>) -> MutexGuard<'_, NetworkLog> {
    network.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
