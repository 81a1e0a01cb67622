//! Integration tests for the crawler
//!
//! Most tests drive the full crawl loop against a `ScriptedSite`, an
//! in-memory render engine with canned pages. The Chromium test at the end
//! serves real pages with wiremock and needs a local browser.

use std::sync::Arc;
use std::time::Duration;
use sumi_sift::crawler::{crawl_site_report, Coordinator, CrawlSession};
use sumi_sift::render::{RenderedPage, ScriptedLauncher, ScriptedSite};
use sumi_sift::scope::HostScope;
use sumi_sift::{crawl_site, CrawlOptions, EngineLauncher, SessionState, SiftError};

fn page(text: &str, links: &[&str], requests: &[&str]) -> RenderedPage {
    RenderedPage {
        text: text.to_string(),
        links: links.iter().map(|s| s.to_string()).collect(),
        requests: requests.iter().map(|s| s.to_string()).collect(),
    }
}

/// A chain of in-scope pages, each linking to the next
fn chain_site(seed: &str, length: usize) -> Arc<ScriptedSite> {
    let site = ScriptedSite::new();
    for i in 0..length {
        let url = if i == 0 {
            seed.to_string()
        } else {
            format!("{seed}/p{i}")
        };
        let next = format!("{seed}/p{}", i + 1);
        site.page(&url, page("", &[next.as_str()], &[]));
    }
    site
}

#[tokio::test]
async fn test_example_two_page_crawl() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page(
            "contact me: a@example.com",
            &["https://example.com/about", "https://other.org"],
            &[],
        ),
    )
    .page(
        "https://example.com/about",
        page("write to b@example.com", &["https://other.org/x"], &[]),
    );
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 2, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.visited,
        vec!["https://example.com", "https://example.com/about"]
    );
    assert_eq!(report.result.emails, vec!["a@example.com", "b@example.com"]);
    assert_eq!(report.state, SessionState::Done);
    assert!(!site.calls().iter().any(|url| url.starts_with("https://other.org")));
}

#[tokio::test]
async fn test_budget_consumed_exactly() {
    let site = chain_site("https://example.com", 10);
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 4, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(report.visited.len(), 4);
    assert_eq!(site.calls().len(), 4);
}

#[tokio::test]
async fn test_small_site_ends_when_frontier_drains() {
    let site = ScriptedSite::new();
    site.page("https://example.com", page("", &["https://example.com/a"], &[]))
        .page("https://example.com/a", page("", &["https://example.com"], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 50, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(report.visited.len(), 2);
    assert_eq!(site.calls().len(), 2);
}

#[tokio::test]
async fn test_visited_urls_share_seed_prefix() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com/docs",
        page(
            "",
            &[
                "https://example.com/docs/intro",
                "https://example.com/blog",
                "http://example.com/docs/insecure",
                "https://cdn.example.com/docs/file",
            ],
            &[],
        ),
    )
    .page("https://example.com/docs/intro", page("", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(
        &launcher,
        "https://example.com/docs",
        10,
        &CrawlOptions::default(),
    )
    .await
    .unwrap();

    assert!(report
        .visited
        .iter()
        .all(|url| url.starts_with("https://example.com/docs")));
    assert_eq!(
        site.calls(),
        vec!["https://example.com/docs", "https://example.com/docs/intro"]
    );
}

#[tokio::test]
async fn test_prefix_scope_admits_lookalike_hosts() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page("", &["https://example.com.evil.org/"], &[]),
    )
    .page("https://example.com.evil.org/", page("spy@evil.org", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let result = crawl_site(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(result.emails, vec!["spy@evil.org"]);
}

#[tokio::test]
async fn test_host_scope_follows_same_host_only() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com/",
        page(
            "",
            &["https://example.com.evil.org/", "https://example.com/team"],
            &[],
        ),
    )
    .page("https://example.com/team", page("team@example.com", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let session = CrawlSession::new("https://example.com/", 5).unwrap();
    let engine = launcher.launch().await.unwrap();
    let report = Coordinator::with_scope(
        engine,
        session,
        &CrawlOptions::default(),
        Box::new(HostScope),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        report.visited,
        vec!["https://example.com/", "https://example.com/team"]
    );
    assert_eq!(report.result.emails, vec!["team@example.com"]);
}

#[tokio::test]
async fn test_emails_deduplicated_across_pages() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page("info@example.com", &["https://example.com/contact"], &[]),
    )
    .page(
        "https://example.com/contact",
        page("info@example.com or sales@example.com", &[], &[]),
    );
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let result = crawl_site(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(result.emails, vec!["info@example.com", "sales@example.com"]);
}

#[tokio::test]
async fn test_trackers_classified_by_substring() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page(
            "",
            &["https://example.com/next"],
            &[
                "https://example.com/app.js",
                "https://www.google-analytics.com/collect?v=1",
                "https://connect.facebook.net/en_US/fbevents.js",
            ],
        ),
    )
    .page(
        "https://example.com/next",
        page(
            "",
            &[],
            &[
                "https://www.google-analytics.com/collect?v=1",
                "https://stats.g.doubleclick.net/r/collect",
                "https://fonts.example.net/font.woff2",
            ],
        ),
    );
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let result = crawl_site(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(
        result.trackers,
        vec![
            "https://www.google-analytics.com/collect?v=1",
            "https://connect.facebook.net/en_US/fbevents.js",
            "https://stats.g.doubleclick.net/r/collect",
        ]
    );
}

#[tokio::test]
async fn test_one_failed_page_does_not_abort() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page(
            "a@example.com",
            &["https://example.com/broken", "https://example.com/ok"],
            &["https://www.googletagmanager.com/gtm.js"],
        ),
    )
    .fail("https://example.com/broken", "timed out after 30000ms")
    .page("https://example.com/ok", page("b@example.com", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(report.state, SessionState::Done);
    assert_eq!(report.result.emails, vec!["a@example.com", "b@example.com"]);
    assert_eq!(
        report.result.trackers,
        vec!["https://www.googletagmanager.com/gtm.js"]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, "https://example.com/broken");
    assert!(!report.visited.contains(&"https://example.com/broken".to_string()));
}

#[tokio::test]
async fn test_failed_seed_yields_empty_result() {
    let site = ScriptedSite::new();
    site.fail("https://example.com", "net::ERR_CONNECTION_REFUSED");
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let result = crawl_site(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert!(result.emails.is_empty());
    assert!(result.trackers.is_empty());
    assert_eq!(site.closed_engines(), 1);
}

/// A failed URL never enters the visited set, so rediscovering it as a
/// link on a later page queues it for a second attempt.
#[tokio::test]
async fn test_failed_page_is_retried_when_rediscovered() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page(
            "",
            &["https://example.com/flaky", "https://example.com/b"],
            &[],
        ),
    )
    .flaky(
        "https://example.com/flaky",
        1,
        page("late@example.com", &[], &[]),
    )
    .page(
        "https://example.com/b",
        page("", &["https://example.com/flaky"], &[]),
    );
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 5, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(
        site.calls(),
        vec![
            "https://example.com",
            "https://example.com/flaky",
            "https://example.com/b",
            "https://example.com/flaky",
        ]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.result.emails, vec!["late@example.com"]);
}

#[tokio::test]
async fn test_failures_do_not_consume_budget() {
    let site = ScriptedSite::new();
    site.page(
        "https://example.com",
        page(
            "",
            &[
                "https://example.com/dead1",
                "https://example.com/dead2",
                "https://example.com/live",
            ],
            &[],
        ),
    )
    .page("https://example.com/live", page("", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let report = crawl_site_report(&launcher, "https://example.com", 2, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.visited,
        vec!["https://example.com", "https://example.com/live"]
    );
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn test_render_timeout_is_a_page_failure() {
    let site = chain_site("https://example.com", 3);
    site.set_render_delay(Duration::from_millis(100));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));
    let options = CrawlOptions {
        render_timeout: Duration::from_millis(10),
        ..CrawlOptions::default()
    };

    let report = crawl_site_report(&launcher, "https://example.com", 3, &options)
        .await
        .unwrap();

    assert!(report.visited.is_empty());
    assert_eq!(report.failures[0].reason, "timed out after 10ms");
}

#[tokio::test]
async fn test_engine_closed_after_session() {
    let site = chain_site("https://example.com", 3);
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    crawl_site(&launcher, "https://example.com", 3, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(site.launches(), 1);
    assert_eq!(site.closed_engines(), 1);
    assert_eq!(site.live_engines(), 0);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let site = ScriptedSite::new();
    site.page("https://example.com", page("a@example.com", &[], &[]));
    let launcher = ScriptedLauncher::new(Arc::clone(&site));
    let options = CrawlOptions::default();

    let first = crawl_site(&launcher, "https://example.com", 5, &options)
        .await
        .unwrap();
    let second = crawl_site(&launcher, "https://example.com", 5, &options)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(site.calls().len(), 2);
}

#[tokio::test]
async fn test_invalid_input_never_launches() {
    let site = ScriptedSite::new();
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let bad_seed = crawl_site(&launcher, "example.com", 5, &CrawlOptions::default()).await;
    let zero_budget =
        crawl_site(&launcher, "https://example.com", 0, &CrawlOptions::default()).await;

    assert!(matches!(bad_seed, Err(SiftError::InvalidInput(_))));
    assert!(matches!(zero_budget, Err(SiftError::InvalidInput(_))));
    assert_eq!(site.launches(), 0);
}

#[tokio::test]
async fn test_launch_failure_is_reported() {
    let site = ScriptedSite::new();
    site.refuse_launch();
    let launcher = ScriptedLauncher::new(Arc::clone(&site));

    let result = crawl_site(&launcher, "https://example.com", 5, &CrawlOptions::default()).await;

    assert!(matches!(result, Err(SiftError::Launch(_))));
}

#[tokio::test]
#[ignore] // Requires Chromium to be installed
async fn test_chromium_crawl_against_mock_server() {
    use sumi_sift::config::RendererConfig;
    use sumi_sift::render::ChromiumLauncher;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html").set_body_string(
            r#"<html><body>
            <p id="mail"></p>
            <a href="/about">About</a>
            <a href="https://other.org/">Elsewhere</a>
            <img src="/google-pixel.gif">
            <script>document.getElementById('mail').textContent = 'hello' + '@' + 'example.com';</script>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body>team@example.com</body></html>"),
        )
        .mount(&server)
        .await;

    let launcher = ChromiumLauncher::new(RendererConfig::default());
    let report = crawl_site_report(&launcher, &base, 5, &CrawlOptions::default())
        .await
        .expect("crawl failed");

    assert_eq!(report.visited.len(), 2);
    assert!(report.result.emails.contains(&"hello@example.com".to_string()));
    assert!(report.result.emails.contains(&"team@example.com".to_string()));
    assert!(report
        .result
        .trackers
        .iter()
        .any(|url| url.ends_with("/google-pixel.gif")));
}
