//! Page analysis engine
//!
//! This module contains the analysis pipeline for a single page:
//! - Fetching the page with a timed GET
//! - Parsing the body and querying elements
//! - Extracting metadata, headings, links, forms and the HTML version
//! - Probing a bounded sample of links for liveness
//! - Assembling everything into an `AnalysisResult`

mod document;
mod fetcher;
mod forms;
mod headings;
mod links;
mod metadata;
mod probe;
mod result;
mod version;

pub use document::{exists_within, find_within, trimmed_text, Document, Query};
pub use fetcher::{build_http_client, describe_error, fetch_page, FetchOutcome};
pub use forms::{analyze_forms, is_login_form, FormSummary};
pub use headings::{extract_headings, Headings};
pub use links::{classify, classify_links, LinkKind, LinkSummary};
pub use metadata::{extract_description, extract_title};
pub use probe::{head_status, probe_links, ProbeReport};
pub use result::{assemble, page_size, AnalysisResult, BrokenLink, PageMetrics};
pub use version::{detect_html_version, HtmlVersion};

use crate::config::{AnalyzerConfig, Config};
use crate::url::parse_target;
use crate::AnalyzerError;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Analyzes web pages with a shared HTTP client
///
/// An `Analyzer` holds no per-run state; it can be shared behind an `Arc`
/// and used for many concurrent analyses.
pub struct Analyzer {
    client: Client,
    settings: AnalyzerConfig,
}

impl Analyzer {
    /// Creates an analyzer from the full configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Analyzer)` - Ready to analyze pages
    /// * `Err(AnalyzerError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, AnalyzerError> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::with_client(client, config.analyzer.clone()))
    }

    /// Creates an analyzer around an existing HTTP client
    pub fn with_client(client: Client, settings: AnalyzerConfig) -> Self {
        Self { client, settings }
    }

    /// Returns the analyzer settings
    pub fn settings(&self) -> &AnalyzerConfig {
        &self.settings
    }

    /// Analyzes the page at `target`
    ///
    /// # Returns
    ///
    /// * `Ok(AnalysisResult)` - The analysis ran; `error_message` tells
    ///   whether it failed or degraded along the way
    /// * `Err(AnalyzerError::InvalidUrl)` - The target is not an absolute URL
    ///   with a host; no request was made
    ///
    /// # Example
    ///
    /// ```no_run
    /// use page_lens::{Analyzer, Config};
    ///
    /// # async fn run() -> page_lens::Result<()> {
    /// let analyzer = Analyzer::new(&Config::default())?;
    /// let result = analyzer.analyze("https://example.com/").await?;
    /// println!("{} links", result.total_link_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn analyze(&self, target: &str) -> Result<AnalysisResult, AnalyzerError> {
        self.analyze_with_cancel(target, &CancellationToken::new()).await
    }

    /// Analyzes the page at `target`, honoring `cancel` at the fetch and every probe
    pub async fn analyze_with_cancel(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let url = parse_target(target)?;
        Ok(self.analyze_url(&url, cancel).await)
    }

    /// Runs the pipeline for an already validated target
    pub async fn analyze_url(&self, url: &Url, cancel: &CancellationToken) -> AnalysisResult {
        tracing::info!("Analyzing {}", url);

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalyzerError::Cancelled { url: url.to_string() }),
            fetched = fetch_page(&self.client, url, self.settings.fetch_timeout()) => fetched,
        };

        let fetch = match fetched {
            Ok(fetch) => fetch,
            Err(e) => {
                tracing::warn!("Analysis of {} failed: {}", url, e);
                return AnalysisResult::failed(e.to_string());
            }
        };

        tracing::debug!(
            "Fetched {} with status {} in {:.3}s",
            url,
            fetch.status_code,
            fetch.elapsed.as_secs_f64()
        );

        if fetch.is_error_status() {
            let error = AnalyzerError::HttpStatus {
                url: url.to_string(),
                status: fetch.status_code,
            };
            tracing::warn!("Analysis of {} stopped: {}", url, error);
            return degraded(AnalysisResult::from_fetch(&fetch), error);
        }

        let metrics = match extract_page(&fetch.body, url) {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!("Analysis of {} stopped: {}", url, e);
                return degraded(AnalysisResult::from_fetch(&fetch), e);
            }
        };

        tracing::debug!(
            "{}: {} links ({} internal, {} external, {} other)",
            url,
            metrics.links.total(),
            metrics.links.internal,
            metrics.links.external,
            metrics.links.other()
        );

        let report = probe_links(
            &self.client,
            &metrics.links.resolved,
            self.settings.sample_limit,
            self.settings.probe_timeout(),
            cancel,
        )
        .await;

        tracing::debug!(
            "{}: probed {} links, {} broken",
            url,
            report.probed,
            report.broken.len()
        );

        let cancelled = report.cancelled;
        let result = assemble(&fetch, metrics, report);

        if cancelled {
            let error = AnalyzerError::Cancelled {
                url: url.to_string(),
            };
            tracing::warn!("Analysis of {} degraded: {}", url, error);
            return degraded(result, error);
        }

        tracing::info!(
            "Analyzed {} ({}, {} links, {} broken)",
            url,
            result.status_code,
            result.total_link_count,
            result.broken_links.len()
        );
        result
    }
}

/// Parses the body and runs every synchronous extractor over it
///
/// The parsed document never leaves this function, so nothing borrowed from
/// it is held across an await point.
pub fn extract_page(body: &[u8], base_url: &Url) -> Result<PageMetrics, AnalyzerError> {
    let document = Document::parse(body).map_err(|message| AnalyzerError::Parse {
        url: base_url.to_string(),
        message,
    })?;

    // Rules see the canonical DOCTYPE ahead of the source text, so spacing
    // inside the original declaration does not matter
    let mut markup = document.doctype().unwrap_or_default();
    markup.push_str(&String::from_utf8_lossy(body));
    let html_version = detect_html_version(&markup);

    Ok(PageMetrics {
        html_version,
        meta_title: extract_title(&document),
        meta_description: extract_description(&document),
        headings: extract_headings(&document),
        image_count: document.count(&Query::tag("img")),
        links: classify_links(&document, base_url),
        forms: analyze_forms(&document),
        serialized_len: document.serialize().len(),
    })
}

fn degraded(mut result: AnalysisResult, error: AnalyzerError) -> AnalysisResult {
    result.error_message = Some(error.to_string());
    result
}
