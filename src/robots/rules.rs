//! Wildcard-agent robots.txt evaluator
//!
//! Only groups addressed to `User-agent: *` are kept. Named-agent groups are
//! skipped entirely.

use super::RobotsPolicy;

/// A single Allow or Disallow directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pattern: String,
    allow: bool,
}

impl Directive {
    /// Number of characters in the pattern; longer patterns are more specific
    fn specificity(&self) -> usize {
        self.pattern.chars().count()
    }
}

/// Rules parsed for the wildcard agent
///
/// # Examples
///
/// ```
/// use sitewalk::robots::{GenericAgentRules, RobotsPolicy};
///
/// let rules = GenericAgentRules::parse("User-agent: *\nDisallow: /admin\nAllow: /admin/public\n");
/// assert!(!rules.is_allowed("/admin/secret"));
/// assert!(rules.is_allowed("/admin/public/x"));
/// assert!(rules.is_allowed("/other"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenericAgentRules {
    directives: Vec<Directive>,
    crawl_delay: Option<f64>,
}

impl GenericAgentRules {
    /// The directives that apply to the wildcard agent, in document order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Returns true if no directive restricts anything
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

impl RobotsPolicy for GenericAgentRules {
    fn parse(document: &str) -> Self {
        let mut rules = Self::default();

        // Agents named by the current run of User-agent lines
        let mut group_agents: Vec<String> = Vec::new();
        // Whether the previous directive closed the User-agent run
        let mut in_rules = false;

        for line in document.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            let applies = group_agents.iter().any(|agent| agent == "*");

            match key.as_str() {
                "user-agent" => {
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_ascii_lowercase());
                }
                "allow" | "disallow" => {
                    in_rules = true;
                    if applies && !value.is_empty() {
                        rules.directives.push(Directive {
                            pattern: value.to_string(),
                            allow: key == "allow",
                        });
                    }
                }
                "crawl-delay" => {
                    in_rules = true;
                    if applies {
                        match value.parse::<f64>() {
                            Ok(delay) if delay.is_finite() && delay >= 0.0 => {
                                rules.crawl_delay = Some(delay);
                            }
                            _ => tracing::debug!("Ignoring invalid Crawl-delay {:?}", value),
                        }
                    }
                }
                _ => {}
            }
        }

        rules
    }

    fn allow_all() -> Self {
        Self::default()
    }

    fn is_allowed(&self, path: &str) -> bool {
        let mut best: Option<&Directive> = None;

        for directive in &self.directives {
            if !pattern_matches(&directive.pattern, path) {
                continue;
            }

            best = match best {
                None => Some(directive),
                Some(current) => {
                    let (new_len, cur_len) = (directive.specificity(), current.specificity());
                    if new_len > cur_len || (new_len == cur_len && !directive.allow) {
                        Some(directive)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        best.map(|d| d.allow).unwrap_or(true)
    }

    fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }
}

/// Matches a robots pattern against a path
///
/// `*` matches any run of characters and a trailing `$` anchors the pattern
/// to the end of the path. Without `$` the pattern is a prefix match.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    let mut pieces = pattern.split('*');
    let first = pieces.next().unwrap_or_default();
    let Some(mut rest) = path.strip_prefix(first) else {
        return false;
    };

    let pieces: Vec<&str> = pieces.collect();
    let Some((last, middle)) = pieces.split_last() else {
        return !anchored || rest.is_empty();
    };

    for piece in middle {
        match rest.find(piece) {
            Some(idx) => rest = &rest[idx + piece.len()..],
            None => return false,
        }
    }

    if anchored {
        rest.ends_with(last)
    } else {
        rest.contains(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_example() {
        let rules = GenericAgentRules::parse(
            "User-agent: *\n\
             Disallow: /admin\n\
             Allow: /admin/public\n",
        );

        assert!(!rules.is_allowed("/admin/secret"));
        assert!(rules.is_allowed("/admin/public/x"));
        assert!(rules.is_allowed("/other"));
    }

    #[test]
    fn test_named_agent_groups_skipped() {
        let rules = GenericAgentRules::parse(
            "User-agent: Googlebot\n\
             Disallow: /\n\
             \n\
             User-agent: *\n\
             Disallow: /private\n",
        );

        assert!(rules.is_allowed("/public"));
        assert!(!rules.is_allowed("/private/data"));
        assert_eq!(rules.directives().len(), 1);
    }

    #[test]
    fn test_consecutive_user_agents_share_group() {
        let rules = GenericAgentRules::parse(
            "User-agent: bingbot\n\
             User-agent: *\n\
             Disallow: /shared\n\
             User-agent: bingbot\n\
             Disallow: /bing-only\n",
        );

        assert!(!rules.is_allowed("/shared"));
        assert!(rules.is_allowed("/bing-only"));
    }

    #[test]
    fn test_multiple_wildcard_groups_merge() {
        let rules = GenericAgentRules::parse(
            "User-agent: *\nDisallow: /a\n\nUser-agent: *\nDisallow: /b\n",
        );
        assert!(!rules.is_allowed("/a"));
        assert!(!rules.is_allowed("/b"));
    }

    #[test]
    fn test_keys_case_insensitive_and_comments_stripped() {
        let rules = GenericAgentRules::parse(
            "# robots for example\n\
             USER-AGENT: *   # everyone\n\
             disallow: /tmp # scratch space\n",
        );
        assert!(!rules.is_allowed("/tmp/file"));
    }

    #[test]
    fn test_tie_goes_to_disallow() {
        let rules = GenericAgentRules::parse("User-agent: *\nAllow: /page\nDisallow: /page\n");
        assert!(!rules.is_allowed("/page"));
    }

    #[test]
    fn test_empty_values_impose_nothing() {
        let rules = GenericAgentRules::parse("User-agent: *\nDisallow:\n");
        assert!(rules.is_empty());
        assert!(rules.is_allowed("/anything"));
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let rules = GenericAgentRules::parse(
            "this line has no colon\n\
             User-agent: *\n\
             Sitemap: https://example.com/sitemap.xml\n\
             Unknown-directive: value\n\
             Disallow: /x\n",
        );
        assert!(!rules.is_allowed("/x"));
        assert!(rules.is_allowed("/y"));
    }

    #[test]
    fn test_rules_before_any_user_agent_ignored() {
        let rules = GenericAgentRules::parse("Disallow: /\nUser-agent: *\nDisallow: /x\n");
        assert!(rules.is_allowed("/y"));
    }

    #[test]
    fn test_wildcard_and_anchor_patterns() {
        let rules = GenericAgentRules::parse(
            "User-agent: *\n\
             Disallow: /*.pdf$\n\
             Disallow: /search*q=\n\
             Disallow: /bkshp?\n",
        );

        assert!(!rules.is_allowed("/docs/report.pdf"));
        assert!(rules.is_allowed("/docs/report.pdf.html"));
        assert!(!rules.is_allowed("/search/books?q=rust"));
        assert!(rules.is_allowed("/search/books"));
        assert!(!rules.is_allowed("/bkshp?hl=en"));
        assert!(rules.is_allowed("/bkshp"));
    }

    #[test]
    fn test_query_is_part_of_match() {
        let rules = GenericAgentRules::parse("User-agent: *\nDisallow: /page?private\n");
        assert!(!rules.is_allowed("/page?private=1"));
        assert!(rules.is_allowed("/page"));
    }

    #[test]
    fn test_crawl_delay_recorded_for_wildcard_only() {
        let rules = GenericAgentRules::parse(
            "User-agent: slowbot\nCrawl-delay: 30\n\nUser-agent: *\nCrawl-delay: 1.5\n",
        );
        assert_eq!(rules.crawl_delay(), Some(1.5));

        let rules = GenericAgentRules::parse("User-agent: *\nCrawl-delay: soon\n");
        assert_eq!(rules.crawl_delay(), None);
    }

    #[test]
    fn test_allow_all() {
        let rules = GenericAgentRules::allow_all();
        assert!(rules.is_allowed("/"));
        assert!(rules.is_allowed("/admin"));
        assert_eq!(rules.crawl_delay(), None);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(pattern_matches("/", "/anything"));
        assert!(pattern_matches("/a*c", "/abc"));
        assert!(pattern_matches("/a*c", "/a/b/c/d"));
        assert!(!pattern_matches("/a*c", "/ab"));
        assert!(pattern_matches("/exact$", "/exact"));
        assert!(!pattern_matches("/exact$", "/exact/more"));
        assert!(pattern_matches("*", "/"));
        assert!(pattern_matches("/*/end$", "/x/y/end"));
        assert!(!pattern_matches("/admin", "/Admin"));
    }
}
