//! Title and meta-description extraction

use crate::analyzer::document::{trimmed_text, Document, Query};

/// Extracts the trimmed text of the first `<title>` element
///
/// Returns an empty string when the page has no title.
pub fn extract_title(document: &Document) -> String {
    document
        .find_first(&Query::tag("title"))
        .map(|title| trimmed_text(&title))
        .unwrap_or_default()
}

/// Extracts the page description
///
/// Uses the `content` of the first `<meta name="description">`; when that
/// element is missing or has no `content`, falls back to the first
/// `<meta property="og:description">`. The first candidate always wins and
/// candidates are never merged.
pub fn extract_description(document: &Document) -> String {
    first_content(document, Query::tag("meta").attr_eq("name", "description"))
        .or_else(|| {
            first_content(
                document,
                Query::tag("meta").attr_eq("property", "og:description"),
            )
        })
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

fn first_content(document: &Document, query: Query) -> Option<String> {
    document
        .find_first(&query)
        .and_then(|meta| meta.value().attr("content").map(str::to_string))
}
