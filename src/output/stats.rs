//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::output::summary::{OutputError, OutputResult};
use crate::state::UrlStatus;
use crate::storage::{RunRecord, Storage};
use std::collections::HashMap;

/// Crawl statistics for one persisted run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub run: RunRecord,

    /// Total number of URLs catalogued
    pub total_urls: u64,

    /// Count of URLs by status
    pub urls_by_status: HashMap<UrlStatus, u64>,

    /// Total number of link edges
    pub total_links: u64,
}

impl CrawlStatistics {
    /// Count for one status (zero when absent)
    pub fn count(&self, status: UrlStatus) -> u64 {
        self.urls_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics for the most recent run
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(OutputError::NoRuns)` - The database holds no runs
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<CrawlStatistics> {
    let run = storage.get_latest_run()?.ok_or(OutputError::NoRuns)?;

    Ok(CrawlStatistics {
        total_urls: storage.count_urls(run.id)?,
        urls_by_status: storage.count_by_status(run.id)?,
        total_links: storage.count_links(run.id)?,
        run,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run {} ({})", stats.run.id, stats.run.status.to_db_string());
    println!("  Seed: {}", stats.run.seed);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!();

    println!("Overview:");
    println!("  URLs catalogued: {}", stats.total_urls);
    println!("  Link edges: {}", stats.total_links);
    println!();

    println!("URLs by Status:");
    for status in UrlStatus::all() {
        let count = stats.count(status);
        if count == 0 {
            continue;
        }
        let percentage = if stats.total_urls > 0 {
            (count as f64 / stats.total_urls as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    let visited = stats.count(UrlStatus::Visited);
    let fetched = visited + stats.count(UrlStatus::Unreachable);
    let success_rate = if fetched > 0 {
        (visited as f64 / fetched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        success_rate, visited, fetched
    );
}
