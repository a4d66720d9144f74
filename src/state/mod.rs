//! State module for tracking crawl outcomes
//!
//! # Components
//!
//! - `UrlStatus`: The outcome of a catalogued URL (pending, visited, excluded, ...)
//! - `Catalogue`: The deduplicated record of every URL met, with the link graph

mod catalogue;
mod url_status;

// Re-export main types
pub use catalogue::{Catalogue, UrlRecord};
pub use url_status::UrlStatus;
