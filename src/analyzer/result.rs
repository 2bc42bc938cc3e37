//! Analysis result types and aggregation
//!
//! The `AnalysisResult` is created fresh for every run and handed to the
//! caller, which decides whether and how to persist it.

use crate::analyzer::fetcher::FetchOutcome;
use crate::analyzer::forms::FormSummary;
use crate::analyzer::headings::Headings;
use crate::analyzer::links::LinkSummary;
use crate::analyzer::probe::ProbeReport;
use crate::analyzer::version::HtmlVersion;
use serde::{Deserialize, Serialize};

/// A link whose probe failed or returned an HTTP error status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    /// Resolved absolute URL of the link
    pub url: String,

    /// HTTP status of the probe, or 0 when the probe itself failed
    pub status_code: u16,

    /// Description of the probe failure (only when `status_code` is 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrokenLink {
    /// A link whose probe returned an error status
    pub fn with_status(url: &str, status_code: u16) -> Self {
        Self {
            url: url.to_string(),
            status_code,
            error: None,
        }
    }

    /// A link whose probe failed before any status was received
    pub fn with_error(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            status_code: 0,
            error: Some(error),
        }
    }
}

/// Complete analysis of one page
///
/// Metrics a run did not reach stay at their zero/empty defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    /// HTTP status of the main fetch, 0 when no response was received
    pub status_code: u16,

    /// Detected markup dialect, None when the page was not parsed
    pub html_version: Option<HtmlVersion>,

    pub meta_title: String,
    pub meta_description: String,

    /// Non-empty heading texts per level; counts derive from the lists
    pub headings: Headings,

    pub image_count: usize,
    pub total_link_count: usize,
    pub internal_link_count: usize,
    pub external_link_count: usize,

    /// Broken links among the probed sample, in document order
    pub broken_links: Vec<BrokenLink>,

    pub has_login_form: bool,
    pub form_count: usize,

    /// Elapsed time of the main fetch in seconds
    pub load_time_seconds: f64,

    /// Transport content length, or the re-serialized document size as a fallback
    pub page_size_bytes: u64,

    /// Present iff the run terminated early or degraded
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// A result for a run that never received a response
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A result carrying only the fetch-level metrics
    pub fn from_fetch(fetch: &FetchOutcome) -> Self {
        Self {
            status_code: fetch.status_code,
            load_time_seconds: fetch.elapsed.as_secs_f64(),
            ..Default::default()
        }
    }

    /// Heading texts for `level` (1-6)
    pub fn heading_tags(&self, level: usize) -> &[String] {
        self.headings.tags(level)
    }

    /// Heading count for `level` (1-6)
    pub fn heading_count(&self, level: usize) -> usize {
        self.headings.count(level)
    }

    /// Returns true if the run completed without any caveat
    pub fn is_clean(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Metrics extracted from a parsed document
///
/// Holds only owned data so it can outlive the parsed document.
#[derive(Debug, Clone)]
pub struct PageMetrics {
    pub html_version: HtmlVersion,
    pub meta_title: String,
    pub meta_description: String,
    pub headings: Headings,
    pub image_count: usize,
    pub links: LinkSummary,
    pub forms: FormSummary,

    /// Byte length of the re-serialized document
    pub serialized_len: usize,
}

/// Chooses the reported page size
///
/// Prefers a positive transport content length; otherwise falls back to the
/// byte length of the re-serialized document.
pub fn page_size(content_length: Option<u64>, serialized_len: usize) -> u64 {
    match content_length {
        Some(len) if len > 0 => len,
        _ => serialized_len as u64,
    }
}

/// Assembles the final result from the fetch, the page metrics and the probe report
///
/// A cancelled probe stage does not discard anything; the caller records the
/// cancellation in `error_message`.
pub fn assemble(fetch: &FetchOutcome, metrics: PageMetrics, probe: ProbeReport) -> AnalysisResult {
    let mut result = AnalysisResult::from_fetch(fetch);

    result.page_size_bytes = page_size(fetch.content_length, metrics.serialized_len);
    result.html_version = Some(metrics.html_version);
    result.meta_title = metrics.meta_title;
    result.meta_description = metrics.meta_description;
    result.headings = metrics.headings;
    result.image_count = metrics.image_count;
    result.total_link_count = metrics.links.total();
    result.internal_link_count = metrics.links.internal;
    result.external_link_count = metrics.links.external;
    result.form_count = metrics.forms.form_count;
    result.has_login_form = metrics.forms.has_login_form;
    result.broken_links = probe.broken;

    result
}
