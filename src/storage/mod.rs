//! Storage module for persisting crawl history
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Appending completed crawls
//! - Listing past crawls newest first

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{CrawlStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A stored crawl, shaped the way the HTTP API returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCrawl {
    pub id: i64,
    pub url: String,
    pub emails: Vec<String>,
    pub trackers: Vec<String>,
    /// When the crawl was stored; RFC 3339 in JSON
    pub timestamp: DateTime<Utc>,
}
