//! Broken-link probing
//!
//! Only a bounded prefix of the resolved links is probed, each with its own
//! HEAD request and timeout. Probes run concurrently but the report keeps
//! document order.

use crate::analyzer::fetcher::describe_error;
use crate::analyzer::result::BrokenLink;
use crate::AnalyzerError;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Outcome of probing the sampled links
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Number of probes that ran to completion
    pub probed: usize,

    /// Broken links, in document order
    pub broken: Vec<BrokenLink>,

    /// True when at least one probe was cut short by cancellation
    pub cancelled: bool,
}

#[derive(Debug)]
enum ProbeOutcome {
    Live,
    Broken(BrokenLink),
    Cancelled,
}

/// Probes the first `sample_limit` links and reports the broken ones
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `links` - Resolved links in document order
/// * `sample_limit` - Maximum number of links to probe (0 disables probing)
/// * `timeout` - Per-probe timeout
/// * `cancel` - Token that aborts outstanding probes
pub async fn probe_links(
    client: &Client,
    links: &[Url],
    sample_limit: usize,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProbeReport {
    let sample = &links[..links.len().min(sample_limit)];
    if sample.is_empty() {
        return ProbeReport::default();
    }

    debug!("Probing {} of {} links", sample.len(), links.len());

    // join_all yields outputs in input order, whatever the completion order
    let outcomes = join_all(
        sample
            .iter()
            .map(|link| probe_one(client, link, timeout, cancel)),
    )
    .await;

    let mut report = ProbeReport::default();
    for outcome in outcomes {
        match outcome {
            ProbeOutcome::Live => report.probed += 1,
            ProbeOutcome::Broken(link) => {
                report.probed += 1;
                report.broken.push(link);
            }
            ProbeOutcome::Cancelled => report.cancelled = true,
        }
    }
    report
}

async fn probe_one(
    client: &Client,
    link: &Url,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ProbeOutcome::Cancelled,
        status = head_status(client, link, timeout) => status,
    };

    match status {
        Ok(code) if code >= 400 => {
            debug!("Broken link {} ({})", link, code);
            ProbeOutcome::Broken(BrokenLink::with_status(link.as_str(), code))
        }
        Ok(_) => ProbeOutcome::Live,
        Err(AnalyzerError::Probe { message, .. }) => {
            debug!("Probe failed for {}: {}", link, message);
            ProbeOutcome::Broken(BrokenLink::with_error(link.as_str(), message))
        }
        Err(e) => ProbeOutcome::Broken(BrokenLink::with_error(link.as_str(), e.to_string())),
    }
}

/// Issues a single HEAD request and returns the response status
pub async fn head_status(
    client: &Client,
    link: &Url,
    timeout: Duration,
) -> Result<u16, AnalyzerError> {
    let response = client
        .head(link.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| AnalyzerError::Probe {
            url: link.to_string(),
            message: describe_error(&e, timeout),
        })?;

    Ok(response.status().as_u16())
}
