//! Markdown report generation
//!
//! This module generates a human-readable markdown report of stored
//! analyses, including status counts, a per-URL overview and broken links.

use crate::output::{format_bytes, OutputResult};
use crate::state::JobState;
use crate::storage::UrlRecord;
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report of the given records
///
/// # Arguments
///
/// * `records` - The stored URL records to report on
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(records: &[UrlRecord], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(records);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats stored records as a markdown report
pub fn format_markdown_report(records: &[UrlRecord]) -> String {
    let mut md = String::new();

    md.push_str("# Page-Lens Analysis Report\n\n");
    md.push_str(&format!("- **Generated**: {}\n", Utc::now().to_rfc3339()));
    md.push_str(&format!("- **URLs**: {}\n\n", records.len()));

    // Status breakdown
    md.push_str("## Status Breakdown\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for state in JobState::all_states() {
        let count = records.iter().filter(|r| r.status == state).count();
        md.push_str(&format!("| {} | {} |\n", state, count));
    }
    md.push('\n');

    if records.is_empty() {
        return md;
    }

    // Per-URL overview
    md.push_str("## URLs\n\n");
    md.push_str("| ID | URL | Status | HTTP | HTML | Title | Links (int/ext) | Broken | Login | Load | Size |\n");
    md.push_str("|----|-----|--------|------|------|-------|-----------------|--------|-------|------|------|\n");
    for record in records {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} ({}/{}) | {} | {} | {:.2}s | {} |\n",
            record.id,
            escape_cell(&record.url),
            record.status,
            record.status_code,
            escape_cell(&record.html_version),
            escape_cell(&record.meta_title),
            record.link_count,
            record.internal_links,
            record.external_links,
            record.broken_link_count,
            if record.has_login_form { "yes" } else { "no" },
            record.load_time_seconds,
            format_bytes(record.page_size_bytes),
        ));
    }
    md.push('\n');

    // Broken links
    let with_broken: Vec<&UrlRecord> = records
        .iter()
        .filter(|r| !r.broken_links.is_empty())
        .collect();
    if !with_broken.is_empty() {
        md.push_str("## Broken Links\n\n");
        for record in with_broken {
            md.push_str(&format!("### {}\n\n", record.url));
            md.push_str("| Link | Status | Error |\n");
            md.push_str("|------|--------|-------|\n");
            for link in &record.broken_links {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    escape_cell(&link.url),
                    link.status_code,
                    escape_cell(link.error.as_deref().unwrap_or("")),
                ));
            }
            md.push('\n');
        }
    }

    // Errors
    let with_errors: Vec<&UrlRecord> = records
        .iter()
        .filter(|r| r.error_message.is_some())
        .collect();
    if !with_errors.is_empty() {
        md.push_str("## Errors\n\n");
        for record in with_errors {
            md.push_str(&format!(
                "- {}: {}\n",
                record.url,
                record.error_message.as_deref().unwrap_or_default()
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
