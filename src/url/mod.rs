//! URL handling module for Page-Lens
//!
//! This module validates analysis targets and extracts the host authority
//! used to classify links as internal or external.

mod domain;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::host_authority;

/// Parses and validates an analysis target
///
/// A target must be an absolute URL with a scheme and a non-empty host.
/// This check runs before any network I/O so a malformed target never
/// reaches the fetcher.
///
/// # Arguments
///
/// * `target` - The raw target string supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - The parsed target
/// * `Err(UrlError)` - The target is not an absolute URL with a host
///
/// # Examples
///
/// ```
/// use page_lens::url::parse_target;
///
/// assert!(parse_target("https://example.com/").is_ok());
/// assert!(parse_target("not a url").is_err());
/// assert!(parse_target("mailto:someone@example.com").is_err());
/// ```
pub fn parse_target(target: &str) -> UrlResult<Url> {
    let url = Url::parse(target.trim())
        .map_err(|e| UrlError::Parse(format!("'{}': {}", target, e)))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(target.to_string())),
    }
}
