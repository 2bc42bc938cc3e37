//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::JobState;
use crate::storage::{AnalysisPatch, UrlFilter, UrlRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("URL not found: {0}")]
    NotFound(i64),

    #[error("URL already exists: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines every operation the analysis pool and the CLI need
/// from persistence. Backends are shared as `Arc<Mutex<dyn Storage + Send>>`.
pub trait Storage {
    // ===== URL Management =====

    /// Inserts a new URL record in the `pending` state
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to store
    /// * `title` - A user-supplied label (may be empty)
    ///
    /// # Returns
    ///
    /// The ID of the new record, or `StorageError::Duplicate` if the URL is
    /// already stored
    fn insert_url(&mut self, url: &str, title: &str) -> StorageResult<i64>;

    /// Inserts a new URL or gets the existing record's ID
    fn insert_or_get_url(&mut self, url: &str, title: &str) -> StorageResult<i64>;

    /// Gets a URL record by ID
    fn get_url(&self, id: i64) -> StorageResult<UrlRecord>;

    /// Gets a URL record by its address
    fn get_url_by_address(&self, url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Lists URL records matching the filter, ordered by ID
    fn list_urls(&self, filter: &UrlFilter) -> StorageResult<Vec<UrlRecord>>;

    /// Deletes a URL record
    fn delete_url(&mut self, id: i64) -> StorageResult<()>;

    // ===== Analysis Results =====

    /// Updates only the status of a URL record
    fn update_status(&mut self, id: i64, status: JobState) -> StorageResult<()>;

    /// Applies an analysis patch in a single transaction
    ///
    /// Fields left as `None` in the patch keep their stored value.
    fn apply_patch(&mut self, id: i64, patch: &AnalysisPatch) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts URL records by status
    fn count_by_status(&self, status: JobState) -> StorageResult<u64>;

    /// Gets the total number of URL records
    fn count_total(&self) -> StorageResult<u64>;
}
