//! Page-Lens: on-demand SEO analysis of web pages
//!
//! This crate fetches a single web page, parses its HTML and derives
//! structured metrics from it: title and description, heading structure,
//! link topology with a sampled broken-link check, form and login-form
//! detection, an HTML version heuristic and coarse performance numbers.
//!
//! Analyses can be run one at a time through [`Analyzer`] or submitted to a
//! bounded [`AnalysisPool`], which can optionally persist results through an
//! injected [`storage::Storage`] backend.

pub mod analyzer;
pub mod config;
pub mod output;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Page-Lens operations
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Failed to fetch URL: {message}")]
    Network { url: String, message: String },

    #[error("HTTP error: {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse HTML: {message}")]
    Parse { url: String, message: String },

    #[error("Probe failed for {url}: {message}")]
    Probe { url: String, message: String },

    #[error("Analysis cancelled")]
    Cancelled { url: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Result type alias for Page-Lens operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analyzer::{AnalysisResult, Analyzer, BrokenLink};
pub use config::Config;
pub use scheduler::{AnalysisPool, JobId};
pub use state::JobState;
pub use crate::url::parse_target;
