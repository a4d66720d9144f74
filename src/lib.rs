//! Sitewalk: a single-domain URL cataloguing crawler
//!
//! This crate crawls one seed domain, follows every same-domain link it is
//! allowed to follow, and records every URL it encounters (local, external or
//! malformed) in a deduplicated catalogue. It honours the site's robots.txt
//! for the wildcard user agent and a global request rate.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewalk operations
///
/// Per-URL problems (malformed links, transport failures, robots exclusions)
/// are catalogue outcomes and never show up here.
#[derive(Debug, Error)]
pub enum SitewalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid seed domain: {0}")]
    InvalidSeed(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sitewalk operations
pub type Result<T> = std::result::Result<T, SitewalkError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Frontier};
pub use state::{Catalogue, UrlRecord, UrlStatus};
pub use crate::url::{classify, classify_link, LinkClass, SeedDomain};
