//! HTTP fetcher implementation
//!
//! This module handles the requests the analyzer makes against remote sites:
//! - Building the HTTP client with the configured user agent
//! - The single timed GET for the page under analysis
//! - Error classification into human-readable descriptions

use crate::config::UserAgentConfig;
use crate::AnalyzerError;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use url::Url;

/// Maximum number of redirects followed for the main fetch and for probes
const MAX_REDIRECTS: usize = 10;

/// Outcome of the main page fetch
///
/// For error statuses (>= 400) the body is not read and `body` is empty.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// HTTP status code of the final response
    pub status_code: u16,

    /// Wall-clock time for the full request/response cycle
    pub elapsed: Duration,

    /// Transport-reported content length, if known
    pub content_length: Option<u64>,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchOutcome {
    /// Returns true when the status code signals an HTTP error (>= 400)
    pub fn is_error_status(&self) -> bool {
        self.status_code >= 400
    }
}

/// Builds an HTTP client with proper configuration
///
/// Timeouts are not set on the client: the main fetch and each probe carry
/// their own per-request timeout.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_lens::config::UserAgentConfig;
/// use page_lens::analyzer::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the page under analysis with a single timed GET
///
/// The elapsed time covers sending the request, receiving the headers and,
/// for successful statuses, reading the whole body. The timeout bounds the
/// same window.
///
/// # Returns
///
/// * `Ok(FetchOutcome)` - A response was received (any status)
/// * `Err(AnalyzerError::Network)` - DNS, connect, TLS, timeout or body read failure
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<FetchOutcome, AnalyzerError> {
    let started = Instant::now();

    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| network_error(url, &e, timeout))?;

    let status_code = response.status().as_u16();
    let content_length = response.content_length();

    if status_code >= 400 {
        return Ok(FetchOutcome {
            status_code,
            elapsed: started.elapsed(),
            content_length,
            body: Vec::new(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| network_error(url, &e, timeout))?;

    Ok(FetchOutcome {
        status_code,
        elapsed: started.elapsed(),
        content_length,
        body: body.to_vec(),
    })
}

/// Classifies a transport error into a human-readable description
pub fn describe_error(error: &reqwest::Error, timeout: Duration) -> String {
    if error.is_timeout() {
        format!("request timed out after {}s", timeout.as_secs())
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        format!("too many redirects: {}", error)
    } else if error.is_body() || error.is_decode() {
        format!("failed to read response body: {}", error)
    } else {
        error.to_string()
    }
}

fn network_error(url: &Url, error: &reqwest::Error, timeout: Duration) -> AnalyzerError {
    AnalyzerError::Network {
        url: url.to_string(),
        message: describe_error(error, timeout),
    }
}
