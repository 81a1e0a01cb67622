//! Storage traits and error types
//!
//! This module defines the trait interface for crawl history backends and
//! associated error types.

use crate::storage::PersistedCrawl;
use crate::CrawlResult;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl history backends
///
/// Records are only ever appended; nothing updates or deletes them.
pub trait CrawlStore: Send {
    /// Appends one completed crawl, stamped with the current UTC time
    ///
    /// # Arguments
    ///
    /// * `url` - The seed URL as the caller gave it
    /// * `result` - Emails and trackers the crawl found
    ///
    /// # Returns
    ///
    /// The ID of the new record
    fn record_crawl(&mut self, url: &str, result: &CrawlResult) -> StorageResult<i64>;

    /// Returns every stored crawl, newest first
    fn list_crawls(&self) -> StorageResult<Vec<PersistedCrawl>>;

    /// Number of stored crawls
    fn count_crawls(&self) -> StorageResult<u64>;
}
