//! Storage module for persisting URLs and their analyses
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - URL record management (add, list, search, delete)
//! - Applying analysis results as typed patches

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::analyzer::{AnalysisResult, BrokenLink, Headings};
use crate::state::JobState;
use crate::AnalyzerError;
use chrono::{DateTime, Utc};
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
/// * `Err(AnalyzerError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, AnalyzerError> {
    SqliteStorage::new(path)
}

/// Represents a stored URL and its latest analysis
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub status: JobState,
    pub status_code: u16,
    pub meta_title: String,
    pub meta_description: String,

    /// Label of the detected HTML version, empty before the first analysis
    pub html_version: String,

    pub headings: Headings,
    pub image_count: u64,
    pub link_count: u64,
    pub internal_links: u64,
    pub external_links: u64,
    pub broken_link_count: u64,
    pub broken_links: Vec<BrokenLink>,
    pub has_login_form: bool,
    pub form_count: u64,
    pub load_time_seconds: f64,
    pub page_size_bytes: u64,
    pub analyzed_at: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Filter for listing URL records
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    /// Only records in this state
    pub status: Option<JobState>,

    /// Case-insensitive substring matched against the URL and the title
    pub search: Option<String>,
}

impl UrlFilter {
    pub fn with_status(mut self, status: JobState) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }
}

/// A partial update of a URL record's analysis fields
///
/// Every field is optional; `None` leaves the stored value unchanged. For
/// `error_message`, `Some(None)` clears the stored message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPatch {
    pub status: Option<JobState>,
    pub status_code: Option<u16>,
    pub html_version: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub headings: Option<Headings>,
    pub image_count: Option<usize>,
    pub link_count: Option<usize>,
    pub internal_links: Option<usize>,
    pub external_links: Option<usize>,
    pub broken_links: Option<Vec<BrokenLink>>,
    pub has_login_form: Option<bool>,
    pub form_count: Option<usize>,
    pub load_time_seconds: Option<f64>,
    pub page_size_bytes: Option<u64>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub error_message: Option<Option<String>>,
}

impl AnalysisPatch {
    /// A patch that only changes the status
    pub fn status(status: JobState) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// The full patch for a finished analysis
    ///
    /// The status is derived from the result: an error without any status
    /// code marks the record failed, anything else completed.
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            status: Some(JobState::for_result(result)),
            status_code: Some(result.status_code),
            html_version: Some(
                result
                    .html_version
                    .map(|v| v.as_str().to_string())
                    .unwrap_or_default(),
            ),
            meta_title: Some(result.meta_title.clone()),
            meta_description: Some(result.meta_description.clone()),
            headings: Some(result.headings.clone()),
            image_count: Some(result.image_count),
            link_count: Some(result.total_link_count),
            internal_links: Some(result.internal_link_count),
            external_links: Some(result.external_link_count),
            broken_links: Some(result.broken_links.clone()),
            has_login_form: Some(result.has_login_form),
            form_count: Some(result.form_count),
            load_time_seconds: Some(result.load_time_seconds),
            page_size_bytes: Some(result.page_size_bytes),
            analyzed_at: Some(Utc::now()),
            error_message: Some(result.error_message.clone()),
        }
    }

    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
