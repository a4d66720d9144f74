//! Crawl summary types
//!
//! A [`CrawlSummary`] condenses a catalogue into the figures and lists the
//! reports are rendered from.

use crate::crawler::CrawlReport;
use crate::state::{Catalogue, UrlStatus};
use crate::url::extract_domain;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("No crawl runs found in database")]
    NoRuns,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub seed: String,
    pub run_id: Option<i64>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,
    pub robots_found: bool,
    pub request_interval_ms: u64,

    // Overall statistics
    pub total_urls: u64,
    pub total_links: u64,
    pub pages_fetched: u64,

    // Status breakdown
    pub urls_pending: u64,
    pub urls_visited: u64,
    pub urls_unreachable: u64,
    pub urls_excluded: u64,
    pub urls_external: u64,
    pub urls_malformed: u64,

    /// External hosts with the number of links pointing at them, most referenced first
    pub external_hosts: Vec<(String, u64)>,

    /// Unreachable URLs with the failure reason
    pub unreachable: Vec<(String, String)>,

    /// URLs excluded by robots.txt
    pub excluded: Vec<String>,

    /// Malformed link strings
    pub malformed: Vec<String>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary from a finished crawl
    pub fn from_catalogue(seed: &str, catalogue: &Catalogue, report: &CrawlReport) -> Self {
        let counts = catalogue.count_by_status();
        let count = |status: UrlStatus| counts.get(&status).copied().unwrap_or(0) as u64;

        let mut host_refs: HashMap<String, u64> = HashMap::new();
        for (_, to) in catalogue.edges() {
            let is_external = catalogue
                .get(to)
                .map(|r| r.status == UrlStatus::External)
                .unwrap_or(false);
            if !is_external {
                continue;
            }
            if let Some(host) = Url::parse(to).ok().as_ref().and_then(extract_domain) {
                *host_refs.entry(host).or_insert(0) += 1;
            }
        }
        let mut external_hosts: Vec<_> = host_refs.into_iter().collect();
        external_hosts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let unreachable = catalogue
            .with_status(UrlStatus::Unreachable)
            .map(|r| {
                let reason = r
                    .failure
                    .as_ref()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                (r.key.clone(), reason)
            })
            .collect();

        let status = if report.interrupted {
            "interrupted"
        } else {
            "completed"
        };

        Self {
            seed: seed.to_string(),
            run_id: None,
            started_at: report.started_at.to_rfc3339(),
            finished_at: Some(report.finished_at.to_rfc3339()),
            duration_seconds: Some((report.finished_at - report.started_at).num_seconds().max(0) as u64),
            status: status.to_string(),
            config_hash: String::new(),
            robots_found: report.robots_found,
            request_interval_ms: report.request_interval.as_millis() as u64,
            total_urls: catalogue.len() as u64,
            total_links: catalogue.edge_count() as u64,
            pages_fetched: report.pages_fetched as u64,
            urls_pending: count(UrlStatus::Pending),
            urls_visited: count(UrlStatus::Visited),
            urls_unreachable: count(UrlStatus::Unreachable),
            urls_excluded: count(UrlStatus::ExcludedByPolicy),
            urls_external: count(UrlStatus::External),
            urls_malformed: count(UrlStatus::Malformed),
            external_hosts,
            unreachable,
            excluded: catalogue
                .with_status(UrlStatus::ExcludedByPolicy)
                .map(|r| r.key.clone())
                .collect(),
            malformed: catalogue
                .with_status(UrlStatus::Malformed)
                .map(|r| r.key.clone())
                .collect(),
        }
    }

    /// Attaches the persisted run this summary belongs to
    pub fn with_run(mut self, run_id: i64, config_hash: &str) -> Self {
        self.run_id = Some(run_id);
        self.config_hash = config_hash.to_string();
        self
    }

    /// Returns the success rate of page fetches as a percentage
    pub fn success_rate(&self) -> f64 {
        let fetched = self.urls_visited + self.urls_unreachable;
        if fetched == 0 {
            return 0.0;
        }
        (self.urls_visited as f64 / fetched as f64) * 100.0
    }
}
