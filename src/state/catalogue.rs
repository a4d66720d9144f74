//! The deduplicated record of every URL met during a crawl

use crate::crawler::FailureReason;
use crate::state::UrlStatus;
use crate::url::{ClassifiedLink, LinkClass};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One catalogued URL
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// The string as first discovered
    pub raw: String,
    /// Identity key (normalized URL, or trimmed raw string when malformed)
    pub key: String,
    pub class: LinkClass,
    pub status: UrlStatus,
    /// Set when `status` is `Unreachable`
    pub failure: Option<FailureReason>,
    pub title: Option<String>,
    /// HTTP status of the fetch, when one was received
    pub status_code: Option<u16>,
    /// Key of the page the URL was first found on (`None` for the seed)
    pub discovered_from: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a record for a classified link
    pub fn new(link: &ClassifiedLink, status: UrlStatus, discovered_from: Option<&str>) -> Self {
        Self {
            raw: link.raw.clone(),
            key: link.key.clone(),
            class: link.class,
            status,
            failure: None,
            title: None,
            status_code: None,
            discovered_from: discovered_from.map(str::to_string),
            discovered_at: Utc::now(),
        }
    }
}

/// Mapping from identity key to record, plus the link graph
///
/// Entries are never removed. Only the crawl loop mutates a catalogue; the
/// public surface is read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    records: BTreeMap<String, UrlRecord>,
    edges: BTreeSet<(String, String)>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&UrlRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Records in key order
    pub fn records(&self) -> impl Iterator<Item = &UrlRecord> {
        self.records.values()
    }

    /// Records with the given status, in key order
    pub fn with_status(&self, status: UrlStatus) -> impl Iterator<Item = &UrlRecord> {
        self.records.values().filter(move |r| r.status == status)
    }

    /// Deduplicated (source page, target key) pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(from, to)| (from.as_str(), to.as_str()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of records per status
    pub fn count_by_status(&self) -> HashMap<UrlStatus, usize> {
        let mut counts = HashMap::new();
        for record in self.records.values() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    /// Inserts a record unless its key is already catalogued
    ///
    /// Returns true if the record was inserted.
    pub(crate) fn insert_if_absent(&mut self, record: UrlRecord) -> bool {
        if self.records.contains_key(&record.key) {
            return false;
        }
        self.records.insert(record.key.clone(), record);
        true
    }

    pub(crate) fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.insert((from.to_string(), to.to_string()));
    }

    /// Marks a pending record as visited
    pub(crate) fn mark_visited(&mut self, key: &str, status_code: u16, title: Option<String>) {
        if let Some(record) = self.records.get_mut(key) {
            record.status = UrlStatus::Visited;
            record.status_code = Some(status_code);
            record.title = title;
        }
    }

    /// Marks a pending record as unreachable
    pub(crate) fn mark_unreachable(&mut self, key: &str, reason: FailureReason) {
        if let Some(record) = self.records.get_mut(key) {
            record.status = UrlStatus::Unreachable;
            record.status_code = reason.status_code();
            record.failure = Some(reason);
        }
    }
}
