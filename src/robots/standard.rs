//! General-purpose robots.txt evaluator backed by the `robotstxt` crate

use robotstxt::DefaultMatcher;

use super::{GenericAgentRules, RobotsPolicy};

/// Product token presented to the matcher
///
/// Groups for this token are honoured in addition to the `*` group.
pub const AGENT_TOKEN: &str = "sitewalk";

/// Robots evaluation using Google's matching rules
///
/// The document is kept and matched on demand, since the matcher works on raw
/// robots.txt text. Each [`RobotsPolicy::is_allowed`] call therefore re-reads
/// the whole document, which costs time linear in its size. The frontier asks
/// once per distinct URL, so a crawl pays that cost once per catalogued local
/// URL rather than once per link. [`GenericAgentRules`] parses up front and is
/// the default evaluator.
#[derive(Debug, Clone, Default)]
pub struct StandardRules {
    content: String,
    crawl_delay: Option<f64>,
}

impl RobotsPolicy for StandardRules {
    fn parse(document: &str) -> Self {
        Self {
            content: document.to_string(),
            crawl_delay: GenericAgentRules::parse(document).crawl_delay(),
        }
    }

    fn allow_all() -> Self {
        Self::default()
    }

    fn is_allowed(&self, path: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, AGENT_TOKEN, path)
    }

    fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }
}
