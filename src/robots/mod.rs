//! Robots.txt handling module
//!
//! This module parses robots.txt documents and answers whether a path may be
//! fetched. Evaluation goes through the [`RobotsPolicy`] trait so the
//! evaluator can be chosen when the crawl is set up.

mod rules;
mod standard;

pub use rules::{Directive, GenericAgentRules};
pub use standard::{StandardRules, AGENT_TOKEN};

use crate::config::RobotsPolicyKind;
use std::fmt::Debug;

/// A robots-exclusion evaluator
///
/// Implementations are immutable once parsed.
pub trait RobotsPolicy: Debug + Send + Sync {
    /// Parses a robots.txt document; unrecognized lines are ignored
    fn parse(document: &str) -> Self
    where
        Self: Sized;

    /// A policy that allows every path
    fn allow_all() -> Self
    where
        Self: Sized;

    /// Checks whether a path (with `?query` when present) may be fetched
    fn is_allowed(&self, path: &str) -> bool;

    /// Crawl-delay in seconds, when the document declares one
    fn crawl_delay(&self) -> Option<f64> {
        None
    }
}

/// Builds a policy of the given kind
///
/// # Arguments
///
/// * `kind` - Which evaluator to use
/// * `document` - The robots.txt content, or `None` if it could not be fetched
///
/// # Returns
///
/// A boxed policy; `None` yields an allow-all policy.
///
/// # Examples
///
/// ```
/// use sitewalk::config::RobotsPolicyKind;
/// use sitewalk::robots::build_policy;
///
/// let policy = build_policy(RobotsPolicyKind::Generic, Some("User-agent: *\nDisallow: /b\n"));
/// assert!(!policy.is_allowed("/b"));
///
/// let policy = build_policy(RobotsPolicyKind::Standard, None);
/// assert!(policy.is_allowed("/b"));
/// ```
pub fn build_policy(kind: RobotsPolicyKind, document: Option<&str>) -> Box<dyn RobotsPolicy> {
    match (kind, document) {
        (RobotsPolicyKind::Generic, Some(doc)) => Box::new(GenericAgentRules::parse(doc)),
        (RobotsPolicyKind::Generic, None) => Box::new(GenericAgentRules::allow_all()),
        (RobotsPolicyKind::Standard, Some(doc)) => Box::new(StandardRules::parse(doc)),
        (RobotsPolicyKind::Standard, None) => Box::new(StandardRules::allow_all()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "User-agent: *\nDisallow: /admin\nAllow: /admin/public\n";

    #[test]
    fn test_both_kinds_agree_on_basic_rules() {
        for kind in [RobotsPolicyKind::Generic, RobotsPolicyKind::Standard] {
            let policy = build_policy(kind, Some(DOC));
            assert!(!policy.is_allowed("/admin/secret"), "{:?}", kind);
            assert!(policy.is_allowed("/admin/public/x"), "{:?}", kind);
            assert!(policy.is_allowed("/other"), "{:?}", kind);
        }
    }

    #[test]
    fn test_missing_document_allows_all() {
        for kind in [RobotsPolicyKind::Generic, RobotsPolicyKind::Standard] {
            let policy = build_policy(kind, None);
            assert!(policy.is_allowed("/admin"));
            assert_eq!(policy.crawl_delay(), None);
        }
    }
}
