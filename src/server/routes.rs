//! Route handlers

use super::AppState;
use crate::crawler::CrawlResult;
use crate::storage::PersistedCrawl;
use crate::{validate_seed_url, SiftError};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

const INVALID_REQUEST: &str = "Valid URL required";

/// Body of `POST /crawl`
#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_pages: Option<usize>,
}

pub async fn banner(State(state): State<AppState>) -> String {
    format!("Crawler API running on port {}", state.port)
}

/// Runs one crawl session and stores its result
///
/// A body that is missing, not JSON, or has the wrong field types is
/// answered the same way as a bad seed.
pub async fn start_crawl(
    State(state): State<AppState>,
    body: Result<Json<CrawlRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected crawl request body: {}", rejection);
            return bad_request();
        }
    };
    let Some(url) = request.url.filter(|url| validate_seed_url(url).is_ok()) else {
        return bad_request();
    };
    let budget = request.max_pages.unwrap_or(state.default_budget);
    if budget == 0 {
        return bad_request();
    }

    match state.limiter.crawl(&url, budget).await {
        Ok(result) => {
            store_result(&state, &url, &result);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(SiftError::InvalidInput(_)) => bad_request(),
        Err(e) => {
            tracing::error!("Crawl of {} failed: {}", url, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Crawl failed", "details": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn list_crawls(State(state): State<AppState>) -> Response {
    let listed = state.lock_store().and_then(|store| store.list_crawls());

    match listed {
        Ok(crawls) => Json::<Vec<PersistedCrawl>>(crawls).into_response(),
        Err(e) => {
            tracing::error!("Listing crawls failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "DB fetch failed" })),
            )
                .into_response()
        }
    }
}

/// Persists a finished crawl; failures are logged, never surfaced
fn store_result(state: &AppState, url: &str, result: &CrawlResult) {
    let stored = state
        .lock_store()
        .and_then(|mut store| store.record_crawl(url, result));

    if let Err(e) = stored {
        tracing::error!("Failed to store crawl of {}: {}", url, e);
    }
}

fn bad_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": INVALID_REQUEST })),
    )
        .into_response()
}
