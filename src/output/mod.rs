//! Output module for generating crawl summaries and reports
//!
//! This module handles:
//! - Condensing a catalogue into a summary
//! - Generating markdown summaries of crawl results
//! - Reading back statistics of persisted runs

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use summary::{CrawlSummary, OutputError, OutputResult};
