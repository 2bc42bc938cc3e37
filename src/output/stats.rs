//! Statistics generation from the analysis database
//!
//! This module provides functionality for extracting and displaying
//! statistics about stored URLs and their analyses.

use crate::output::OutputResult;
use crate::state::JobState;
use crate::storage::{Storage, UrlFilter};
use std::collections::HashMap;

/// Summary of stored analyses
#[derive(Debug, Clone, Default)]
pub struct AnalysisStatistics {
    /// Total number of stored URLs
    pub total_urls: u64,

    /// Count of URLs by status
    pub urls_by_status: HashMap<JobState, u64>,

    /// Broken links found across all analyzed URLs
    pub total_broken_links: u64,

    /// Mean load time of URLs that received a response
    pub average_load_time: Option<f64>,
}

impl AnalysisStatistics {
    /// Returns the number of URLs in `status`
    pub fn count(&self, status: JobState) -> u64 {
        self.urls_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(AnalysisStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<AnalysisStatistics> {
    let total_urls = storage.count_total()?;

    let mut urls_by_status = HashMap::new();
    for state in JobState::all_states() {
        let count = storage.count_by_status(state)?;
        if count > 0 {
            urls_by_status.insert(state, count);
        }
    }

    let records = storage.list_urls(&UrlFilter::default())?;
    let total_broken_links = records.iter().map(|r| r.broken_link_count).sum();

    let load_times: Vec<f64> = records
        .iter()
        .filter(|r| r.status_code > 0)
        .map(|r| r.load_time_seconds)
        .collect();
    let average_load_time = if load_times.is_empty() {
        None
    } else {
        Some(load_times.iter().sum::<f64>() / load_times.len() as f64)
    };

    Ok(AnalysisStatistics {
        total_urls,
        urls_by_status,
        total_broken_links,
        average_load_time,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &AnalysisStatistics) {
    println!("=== Analysis Statistics ===\n");

    println!("Overview:");
    println!("  Stored URLs: {}", stats.total_urls);
    println!("  Broken links found: {}", stats.total_broken_links);
    if let Some(average) = stats.average_load_time {
        println!("  Average load time: {:.3}s", average);
    }
    println!();

    println!("URLs by Status:");
    for state in JobState::all_states() {
        let count = stats.count(state);
        let percentage = if stats.total_urls > 0 {
            (count as f64 / stats.total_urls as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
}
