//! Integration tests for the HTTP API
//!
//! Requests go straight into the axum router with `oneshot`; crawls run
//! against a `ScriptedSite` and results land in an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use sumi_sift::crawler::SessionLimiter;
use sumi_sift::render::{RenderedPage, ScriptedLauncher, ScriptedSite};
use sumi_sift::server::{build_router, AppState};
use sumi_sift::storage::{CrawlStore, PersistedCrawl, SqliteStorage, StorageError, StorageResult};
use sumi_sift::{CrawlOptions, CrawlResult};
use tower::ServiceExt;

fn example_site() -> Arc<ScriptedSite> {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        RenderedPage {
            text: "contact me: a@example.com".to_string(),
            links: vec![
                "https://example.com/about".to_string(),
                "https://other.org".to_string(),
            ],
            requests: vec!["https://www.google-analytics.com/collect".to_string()],
        },
    )
    .page(
        "https://example.com/about",
        RenderedPage {
            text: "b@example.com".to_string(),
            ..Default::default()
        },
    );
    site
}

fn app_with_store(site: &Arc<ScriptedSite>, store: Box<dyn CrawlStore>) -> (Router, AppState) {
    let limiter = Arc::new(SessionLimiter::new(
        Arc::new(ScriptedLauncher::new(Arc::clone(site))),
        CrawlOptions::default(),
        2,
    ));
    let state = AppState::new(limiter, store, 5, 3030);
    (build_router(state.clone()), state)
}

fn app(site: &Arc<ScriptedSite>) -> (Router, AppState) {
    app_with_store(site, Box::new(SqliteStorage::new_in_memory().unwrap()))
}

fn post_crawl(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/crawl")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A store whose every call fails
struct BrokenStore;

impl CrawlStore for BrokenStore {
    fn record_crawl(&mut self, _url: &str, _result: &CrawlResult) -> StorageResult<i64> {
        Err(StorageError::Database("disk full".to_string()))
    }

    fn list_crawls(&self) -> StorageResult<Vec<PersistedCrawl>> {
        Err(StorageError::Database("disk full".to_string()))
    }

    fn count_crawls(&self) -> StorageResult<u64> {
        Err(StorageError::Database("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_banner() {
    let (app, _) = app(&ScriptedSite::new());

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Crawler API running on port 3030");
}

#[tokio::test]
async fn test_crawl_returns_result_and_stores_it() {
    let site = example_site();
    let (app, state) = app(&site);

    let response = app
        .oneshot(post_crawl(&json!({ "url": "https://example.com", "max_pages": 2 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "emails": ["a@example.com", "b@example.com"],
            "trackers": ["https://www.google-analytics.com/collect"],
        })
    );

    let stored = state.store.lock().unwrap().list_crawls().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].url, "https://example.com");
    assert_eq!(stored[0].emails, vec!["a@example.com", "b@example.com"]);
}

#[tokio::test]
async fn test_crawl_uses_default_budget() {
    // A chain longer than the budget, every link under the seed prefix
    let seed = "https://example.com/p";
    let site = ScriptedSite::new();
    for i in 0..10 {
        let url = if i == 0 { seed.to_string() } else { format!("{seed}{i}") };
        site.page(
            &url,
            RenderedPage {
                links: vec![format!("{seed}{}", i + 1)],
                ..Default::default()
            },
        );
    }
    let (app, _) = app(&site);

    let response = app
        .oneshot(post_crawl(&json!({ "url": seed })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        site.calls(),
        vec![
            "https://example.com/p",
            "https://example.com/p1",
            "https://example.com/p2",
            "https://example.com/p3",
            "https://example.com/p4",
        ]
    );
}

#[tokio::test]
async fn test_invalid_requests_rejected() {
    let bodies = [
        json!({}),
        json!({ "url": "" }),
        json!({ "url": "example.com" }),
        json!({ "url": "ftp://example.com" }),
        json!({ "url": 42 }),
        json!({ "url": "https://example.com", "max_pages": 0 }),
        json!({ "url": "https://example.com", "max_pages": -3 }),
    ];

    for body in bodies {
        let site = ScriptedSite::new();
        let (app, _) = app(&site);

        let response = app.oneshot(post_crawl(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Valid URL required" })
        );
        assert_eq!(site.launches(), 0);
    }
}

#[tokio::test]
async fn test_non_json_body_rejected() {
    let (app, _) = app(&ScriptedSite::new());
    let request = Request::builder()
        .method("POST")
        .uri("/crawl")
        .body(Body::from("url=https://example.com"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_launch_failure_is_500() {
    let site = ScriptedSite::new();
    site.refuse_launch();
    let (app, state) = app(&site);

    let response = app
        .oneshot(post_crawl(&json!({ "url": "https://example.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Crawl failed");
    assert!(body["details"].as_str().unwrap().contains("no browser available"));
    assert_eq!(state.store.lock().unwrap().count_crawls().unwrap(), 0);
}

#[tokio::test]
async fn test_storage_failure_does_not_change_response() {
    let site = example_site();
    let (app, _) = app_with_store(&site, Box::new(BrokenStore));

    let response = app
        .oneshot(post_crawl(&json!({ "url": "https://example.com", "max_pages": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["emails"], json!(["a@example.com"]));
}

#[tokio::test]
async fn test_list_crawls_newest_first() {
    let site = example_site();
    let (app, _) = app(&site);

    for budget in [1, 2] {
        let response = app
            .clone()
            .oneshot(post_crawl(&json!({ "url": "https://example.com", "max_pages": budget })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/crawls")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let crawls: Vec<PersistedCrawl> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(crawls.len(), 2);
    assert!(crawls[0].id > crawls[1].id);
    assert!(crawls[0].timestamp >= crawls[1].timestamp);
    assert_eq!(crawls[0].emails, vec!["a@example.com", "b@example.com"]);
    assert_eq!(crawls[1].emails, vec!["a@example.com"]);
}

#[tokio::test]
async fn test_list_crawls_storage_error() {
    let (app, _) = app_with_store(&ScriptedSite::new(), Box::new(BrokenStore));

    let response = app.oneshot(get("/crawls")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "DB fetch failed" }));
}

#[tokio::test]
async fn test_cors_headers_present() {
    let (app, _) = app(&ScriptedSite::new());
    let request = Request::builder()
        .uri("/crawls")
        .header(header::ORIGIN, "https://dashboard.example.org")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
