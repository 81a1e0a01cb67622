//! Sumi-Sift: a contact and tracker sifter
//!
//! This crate crawls a bounded slice of a website with a headless browser,
//! collecting email addresses from the rendered text and the third-party
//! tracking requests each page issues while it loads.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod render;
pub mod scope;
pub mod server;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to launch render engine: {0}")]
    Launch(String),

    #[error("Session limiter closed: {0}")]
    Limiter(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Checks that a seed URL is usable before any crawl is started
///
/// The seed only has to be non-empty and begin with `http`; it is not parsed,
/// since the crawl scope compares it as a literal string prefix.
///
/// # Examples
///
/// ```
/// use sumi_sift::validate_seed_url;
///
/// assert!(validate_seed_url("https://example.com").is_ok());
/// assert!(validate_seed_url("ftp://example.com").is_err());
/// assert!(validate_seed_url("").is_err());
/// ```
pub fn validate_seed_url(seed: &str) -> Result<()> {
    if seed.is_empty() || !seed.starts_with("http") {
        return Err(SiftError::InvalidInput(format!(
            "seed URL must start with http, got '{}'",
            seed
        )));
    }
    Ok(())
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_site, CrawlOptions, CrawlResult, DEFAULT_PAGE_BUDGET};
pub use render::{EngineLauncher, RenderEngine, RenderFailure, RenderedPage};
pub use state::SessionState;
