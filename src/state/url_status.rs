/// URL status definitions for catalogue records
///
/// Every catalogued URL is in exactly one of these states. Local URLs move
/// from `Pending` to `Visited` or `Unreachable`; all other states are final
/// from the moment the URL is recorded.
use std::fmt;

/// Represents the crawl outcome of a catalogued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlStatus {
    // ===== Active States =====
    /// Local URL waiting to be fetched
    Pending,

    // ===== Terminal Success States =====
    /// Local URL fetched successfully
    Visited,

    // ===== Terminal Error States =====
    /// Local URL whose fetch failed (timeout, connection, non-2xx, decode)
    Unreachable,

    // ===== Terminal Skip States =====
    /// Local URL that robots.txt does not allow
    ExcludedByPolicy,

    /// URL on another host; recorded, never fetched
    External,

    /// String that could not be resolved into a URL
    Malformed,
}

impl UrlStatus {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the URL was fetched (successfully or not)
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Visited | Self::Unreachable)
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Visited => "visited",
            Self::Unreachable => "unreachable",
            Self::ExcludedByPolicy => "excluded_by_policy",
            Self::External => "external",
            Self::Malformed => "malformed",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "visited" => Some(Self::Visited),
            "unreachable" => Some(Self::Unreachable),
            "excluded_by_policy" => Some(Self::ExcludedByPolicy),
            "external" => Some(Self::External),
            "malformed" => Some(Self::Malformed),
            _ => None,
        }
    }

    /// Returns all statuses in display order
    pub fn all() -> [Self; 6] {
        [
            Self::Pending,
            Self::Visited,
            Self::Unreachable,
            Self::ExcludedByPolicy,
            Self::External,
            Self::Malformed,
        ]
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Visited => "Visited",
            Self::Unreachable => "Unreachable",
            Self::ExcludedByPolicy => "Excluded by robots.txt",
            Self::External => "External",
            Self::Malformed => "Malformed",
        };
        f.write_str(s)
    }
}
