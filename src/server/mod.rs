//! HTTP API for starting crawls and reading crawl history
//!
//! Routes:
//! - `POST /crawl`: run one crawl session and store its result
//! - `GET /crawls`: every stored crawl, newest first
//! - `GET /`: liveness banner

mod routes;

use crate::crawler::{CrawlOptions, SessionLimiter};
use crate::render::EngineLauncher;
use crate::storage::{CrawlStore, StorageError, StorageResult};
use crate::Config;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Crawl history shared by every request
pub type SharedStore = Arc<Mutex<Box<dyn CrawlStore>>>;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<SessionLimiter>,
    pub store: SharedStore,
    /// Page budget when a request names none
    pub default_budget: usize,
    /// Reported by the banner route
    pub port: u16,
}

impl AppState {
    pub fn new(
        limiter: Arc<SessionLimiter>,
        store: Box<dyn CrawlStore>,
        default_budget: usize,
        port: u16,
    ) -> Self {
        Self {
            limiter,
            store: Arc::new(Mutex::new(store)),
            default_budget,
            port,
        }
    }

    /// Locks the store, reporting a poisoned lock as a database error
    pub(crate) fn lock_store(&self) -> StorageResult<MutexGuard<'_, Box<dyn CrawlStore>>> {
        self.store
            .lock()
            .map_err(|e| StorageError::Database(format!("store lock poisoned: {e}")))
    }
}

/// Builds the axum Router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::banner))
        .route("/crawl", post(routes::start_crawl))
        .route("/crawls", get(routes::list_crawls))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until the process is stopped
///
/// # Arguments
///
/// * `config` - Validated configuration; `server.bind` is the listen address
/// * `launcher` - Source of render engines
/// * `store` - Crawl history backend
pub async fn serve(
    config: &Config,
    launcher: Arc<dyn EngineLauncher>,
    store: Box<dyn CrawlStore>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server.bind.parse()?;

    let limiter = Arc::new(SessionLimiter::new(
        launcher,
        CrawlOptions::from_config(config),
        config.crawler.max_concurrent_sessions,
    ));
    let state = AppState::new(limiter, store, config.crawler.max_pages, addr.port());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Crawler API running on port {}", addr.port());
    axum::serve(listener, app).await?;
    Ok(())
}
