use serde::Deserialize;

/// Main configuration structure for Sumi-Sift
///
/// Every section is optional; a missing file or section falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub trackers: TrackerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl session behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Page budget used when a request does not name one
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-page render ceiling (milliseconds)
    #[serde(rename = "render-timeout-ms", default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Maximum number of crawl sessions (and browsers) alive at once
    #[serde(
        rename = "max-concurrent-sessions",
        default = "default_max_concurrent_sessions"
    )]
    pub max_concurrent_sessions: usize,

    /// Which links count as part of the crawled site
    #[serde(default)]
    pub scope: ScopeKind,
}

/// Scope policy selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Link must start with the literal seed string
    #[default]
    Prefix,
    /// Link must share the seed's hostname
    Host,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Explicit Chromium executable; auto-detected when absent
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,

    /// In-flight request count at or below which the network counts as idle
    #[serde(rename = "idle-connections", default = "default_idle_connections")]
    pub idle_connections: usize,

    /// How long the network must stay idle before a page counts as loaded (milliseconds)
    #[serde(rename = "idle-window-ms", default = "default_idle_window_ms")]
    pub idle_window_ms: u64,

    /// Run Chromium with its sandbox enabled
    #[serde(default)]
    pub sandbox: bool,
}

/// Tracker classification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Substrings that mark a request URL as a tracker
    #[serde(default = "default_tracker_patterns")]
    pub patterns: Vec<String>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

fn default_max_pages() -> usize {
    5
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_max_concurrent_sessions() -> usize {
    2
}

fn default_idle_connections() -> usize {
    2
}

fn default_idle_window_ms() -> u64 {
    500
}

/// Tracker substrings used when the config names none
pub fn default_tracker_patterns() -> Vec<String> {
    vec![
        "google".to_string(),
        "facebook".to_string(),
        "doubleclick".to_string(),
    ]
}

fn default_bind() -> String {
    "0.0.0.0:3030".to_string()
}

fn default_database_path() -> String {
    "./crawls.db".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            render_timeout_ms: default_render_timeout_ms(),
            max_concurrent_sessions: default_max_concurrent_sessions(),
            scope: ScopeKind::default(),
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            idle_connections: default_idle_connections(),
            idle_window_ms: default_idle_window_ms(),
            sandbox: false,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            patterns: default_tracker_patterns(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
