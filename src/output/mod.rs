//! Terminal output for crawl results and crawl history
//!
//! Every printer has a `format_*` counterpart returning the text, so the
//! layout can be checked without capturing stdout.

use crate::crawler::CrawlReport;
use crate::storage::PersistedCrawl;
use crate::SiftError;
use std::fmt::Write;

/// Renders one finished crawl as a human-readable summary
pub fn format_crawl_report(seed_url: &str, report: &CrawlReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl of {} ===\n", seed_url);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Rendered: {}", report.visited.len());
    let _ = writeln!(out, "  Failed: {}", report.failures.len());
    for url in &report.visited {
        let _ = writeln!(out, "  + {}", url);
    }
    for failure in &report.failures {
        let _ = writeln!(out, "  ! {} ({})", failure.url, failure.reason);
    }
    out.push('\n');

    write_list(&mut out, "Emails", &report.result.emails);
    write_list(&mut out, "Trackers", &report.result.trackers);
    out
}

/// Renders stored crawls, newest first, as a human-readable list
pub fn format_history(crawls: &[PersistedCrawl]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl History ({}) ===\n", crawls.len());

    if crawls.is_empty() {
        let _ = writeln!(out, "No crawls stored yet.");
        return out;
    }

    for crawl in crawls {
        let _ = writeln!(out, "#{} {} at {}", crawl.id, crawl.url, crawl.timestamp);
        let _ = writeln!(
            out,
            "  {} emails, {} trackers",
            crawl.emails.len(),
            crawl.trackers.len()
        );
        for email in &crawl.emails {
            let _ = writeln!(out, "  - {}", email);
        }
    }
    out
}

pub fn print_crawl_report(seed_url: &str, report: &CrawlReport) {
    print!("{}", format_crawl_report(seed_url, report));
}

pub fn print_history(crawls: &[PersistedCrawl]) {
    print!("{}", format_history(crawls));
}

/// Pretty JSON for `--json` output
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SiftError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "{} ({}):", title, items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
    out.push('\n');
}
