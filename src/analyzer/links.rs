//! Link resolution and classification
//!
//! Every `<a>` with a non-empty `href` is resolved against the page URL.
//! References that cannot be resolved are skipped entirely; every resolved
//! link counts towards the total, duplicates included.

use crate::analyzer::document::{Document, Query};
use crate::url::host_authority;
use url::Url;

/// Classification of a resolved link relative to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Same host authority as the page
    Internal,
    /// Different, non-empty host authority
    External,
    /// No host at all (`mailto:`, `javascript:`, `tel:`, ...)
    Other,
}

/// Result of link classification for one page
#[derive(Debug, Clone, Default)]
pub struct LinkSummary {
    /// Resolved absolute links, in document order
    pub resolved: Vec<Url>,
    pub internal: usize,
    pub external: usize,
}

impl LinkSummary {
    /// Total number of resolved links (internal + external + other)
    pub fn total(&self) -> usize {
        self.resolved.len()
    }

    /// Number of resolved links that have no host
    pub fn other(&self) -> usize {
        self.total() - self.internal - self.external
    }
}

/// Classifies a resolved link against the page's host authority
///
/// The comparison is an exact string compare on `host[:port]`.
pub fn classify(link: &Url, base_host: &str) -> LinkKind {
    let host = host_authority(link);
    if host.is_empty() {
        LinkKind::Other
    } else if host == base_host {
        LinkKind::Internal
    } else {
        LinkKind::External
    }
}

/// Resolves and classifies every anchor on the page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `base_url` - The page URL used for reference resolution
pub fn classify_links(document: &Document, base_url: &Url) -> LinkSummary {
    let base_host = host_authority(base_url);
    let mut summary = LinkSummary::default();

    for anchor in document.find_all(&Query::tag("a").has_attr("href")) {
        let href = match anchor.value().attr("href") {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };

        let resolved = match base_url.join(href) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("Skipping unresolvable href {:?}: {}", href, e);
                continue;
            }
        };

        match classify(&resolved, &base_host) {
            LinkKind::Internal => summary.internal += 1,
            LinkKind::External => summary.external += 1,
            LinkKind::Other => {}
        }
        summary.resolved.push(resolved);
    }

    summary
}
