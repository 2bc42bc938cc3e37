//! Terminal reports for single analyses

use crate::analyzer::{AnalysisResult, BrokenLink, Headings};
use crate::output::format_bytes;
use crate::state::JobState;
use crate::storage::UrlRecord;
use std::fmt::Write;

/// Prints an analysis result to stdout
pub fn print_result(target: &str, result: &AnalysisResult) {
    println!("{}", format_result(target, result));
}

/// Prints a stored URL record to stdout
pub fn print_record(record: &UrlRecord) {
    println!("{}", format_record(record));
}

/// Formats an analysis result as a human-readable report
pub fn format_result(target: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();
    let state = JobState::for_result(result);

    let _ = writeln!(out, "=== {} ===", target);
    let _ = writeln!(out, "  Status:        {} (HTTP {})", state, result.status_code);
    if let Some(error) = &result.error_message {
        let _ = writeln!(out, "  Error:         {}", error);
    }
    if state == JobState::Failed {
        return out;
    }

    let version = result
        .html_version
        .map(|v| v.as_str())
        .unwrap_or("-");
    let _ = writeln!(out, "  HTML version:  {}", version);
    let _ = writeln!(out, "  Title:         {}", result.meta_title);
    let _ = writeln!(out, "  Description:   {}", result.meta_description);
    let _ = writeln!(
        out,
        "  Load time:     {:.3}s",
        result.load_time_seconds
    );
    let _ = writeln!(out, "  Page size:     {}", format_bytes(result.page_size_bytes));
    let _ = writeln!(out, "  Images:        {}", result.image_count);
    let _ = writeln!(
        out,
        "  Forms:         {} (login form: {})",
        result.form_count,
        if result.has_login_form { "yes" } else { "no" }
    );
    let _ = writeln!(
        out,
        "  Links:         {} total, {} internal, {} external",
        result.total_link_count, result.internal_link_count, result.external_link_count
    );

    write_headings(&mut out, &result.headings);
    write_broken_links(&mut out, &result.broken_links);

    out
}

/// Formats a stored URL record as a human-readable report
pub fn format_record(record: &UrlRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== #{} {} ===", record.id, record.url);
    if !record.title.is_empty() {
        let _ = writeln!(out, "  Label:         {}", record.title);
    }
    let _ = writeln!(
        out,
        "  Status:        {} (HTTP {})",
        record.status, record.status_code
    );
    if let Some(error) = &record.error_message {
        let _ = writeln!(out, "  Error:         {}", error);
    }
    let _ = writeln!(
        out,
        "  Analyzed at:   {}",
        record.analyzed_at.as_deref().unwrap_or("never")
    );
    if record.analyzed_at.is_none() {
        return out;
    }

    let _ = writeln!(out, "  HTML version:  {}", record.html_version);
    let _ = writeln!(out, "  Title:         {}", record.meta_title);
    let _ = writeln!(out, "  Description:   {}", record.meta_description);
    let _ = writeln!(out, "  Load time:     {:.3}s", record.load_time_seconds);
    let _ = writeln!(out, "  Page size:     {}", format_bytes(record.page_size_bytes));
    let _ = writeln!(out, "  Images:        {}", record.image_count);
    let _ = writeln!(
        out,
        "  Forms:         {} (login form: {})",
        record.form_count,
        if record.has_login_form { "yes" } else { "no" }
    );
    let _ = writeln!(
        out,
        "  Links:         {} total, {} internal, {} external",
        record.link_count, record.internal_links, record.external_links
    );

    write_headings(&mut out, &record.headings);
    write_broken_links(&mut out, &record.broken_links);

    out
}

fn write_headings(out: &mut String, headings: &Headings) {
    if headings.total() == 0 {
        return;
    }

    let _ = writeln!(out, "  Headings:");
    for level in 1..=6 {
        let tags = headings.tags(level);
        if !tags.is_empty() {
            let _ = writeln!(out, "    h{} ({}): {}", level, tags.len(), tags.join(", "));
        }
    }
}

fn write_broken_links(out: &mut String, links: &[BrokenLink]) {
    if links.is_empty() {
        return;
    }

    let _ = writeln!(out, "  Broken links ({}):", links.len());
    for link in links {
        match &link.error {
            Some(error) => {
                let _ = writeln!(out, "    - {} ({})", link.url, error);
            }
            None => {
                let _ = writeln!(out, "    - {} (HTTP {})", link.url, link.status_code);
            }
        }
    }
}
