//! URL handling module for Sitewalk
//!
//! This module resolves raw link strings, extracts hosts, and classifies links
//! relative to the seed domain as local, external, or malformed.

mod domain;
mod normalize;

use std::fmt;
use url::Url;

pub use domain::{extract_domain, normalize_host, SeedDomain};
pub use normalize::{resolve_link, robots_path};

/// Link classification relative to the seed domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Same host as the seed - eligible for crawling
    Local,
    /// Valid URL on another host - recorded but never fetched
    External,
    /// Could not be resolved into scheme + host + path
    Malformed,
}

impl LinkClass {
    /// Returns the stable string form used in storage and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::External => "external",
            Self::Malformed => "malformed",
        }
    }

    /// Parses the string form produced by [`LinkClass::as_str`]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "external" => Some(Self::External),
            "malformed" => Some(Self::Malformed),
            _ => None,
        }
    }
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link after resolution and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    /// The string as it appeared in the document
    pub raw: String,
    /// Identity key: the resolved URL for valid links, the trimmed raw string otherwise
    pub key: String,
    pub class: LinkClass,
    /// The resolved URL (absent for malformed links)
    pub url: Option<Url>,
}

/// Resolves and classifies a raw link
///
/// Never fails: anything that cannot be resolved into an HTTP(S) URL with a
/// host is [`LinkClass::Malformed`].
///
/// # Arguments
///
/// * `raw` - The link as found in a document or configuration
/// * `seed` - The domain being crawled
/// * `base` - The page the link was found on, for relative references
///
/// # Examples
///
/// ```
/// use sitewalk::url::{classify_link, LinkClass, SeedDomain};
/// use url::Url;
///
/// let seed = SeedDomain::parse("example.com", "https").unwrap();
/// let base = Url::parse("https://example.com/blog/").unwrap();
///
/// let link = classify_link("post-1?ref=home", &seed, Some(&base));
/// assert_eq!(link.class, LinkClass::Local);
/// assert_eq!(link.key, "https://example.com/blog/post-1?ref=home");
///
/// let link = classify_link("https://other.org/", &seed, Some(&base));
/// assert_eq!(link.class, LinkClass::External);
/// ```
pub fn classify_link(raw: &str, seed: &SeedDomain, base: Option<&Url>) -> ClassifiedLink {
    match resolve_link(raw, seed.scheme(), base) {
        Ok(url) => {
            let class = if seed.contains(&url) {
                LinkClass::Local
            } else {
                LinkClass::External
            };

            ClassifiedLink {
                raw: raw.to_string(),
                key: url.as_str().to_string(),
                class,
                url: Some(url),
            }
        }
        Err(e) => {
            tracing::trace!("Malformed link {:?}: {}", raw, e);
            ClassifiedLink {
                raw: raw.to_string(),
                key: raw.trim().to_string(),
                class: LinkClass::Malformed,
                url: None,
            }
        }
    }
}

/// Classifies a raw link, returning only the tag
///
/// # Examples
///
/// ```
/// use sitewalk::url::{classify, LinkClass, SeedDomain};
///
/// let seed = SeedDomain::parse("example.com", "https").unwrap();
/// assert_eq!(classify("http://EXAMPLE.com/x", &seed, None), LinkClass::Local);
/// assert_eq!(classify("not a url", &seed, None), LinkClass::Malformed);
/// ```
pub fn classify(raw: &str, seed: &SeedDomain, base: Option<&Url>) -> LinkClass {
    classify_link(raw, seed, base).class
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> SeedDomain {
        SeedDomain::parse("example.com", "https").unwrap()
    }

    fn page() -> Url {
        Url::parse("https://example.com/docs/intro.html").unwrap()
    }

    #[test]
    fn test_local_links() {
        let seed = seed();
        assert_eq!(classify("https://example.com/a", &seed, None), LinkClass::Local);
        assert_eq!(classify("/a", &seed, Some(&page())), LinkClass::Local);
        assert_eq!(classify("next.html", &seed, Some(&page())), LinkClass::Local);
        assert_eq!(classify("example.com/a", &seed, None), LinkClass::Local);
    }

    #[test]
    fn test_local_ignores_scheme() {
        assert_eq!(
            classify("http://example.com/a", &seed(), None),
            LinkClass::Local
        );
    }

    #[test]
    fn test_external_links() {
        let seed = seed();
        assert_eq!(classify("https://other.test/x", &seed, None), LinkClass::External);
        assert_eq!(
            classify("https://sub.example.com/", &seed, None),
            LinkClass::External
        );
        assert_eq!(
            classify("//cdn.example.net/a.js", &seed, Some(&page())),
            LinkClass::External
        );
    }

    #[test]
    fn test_malformed_links() {
        let seed = seed();
        let base = page();
        for raw in [
            "not a url",
            "",
            "mailto:team@example.com",
            "javascript:void(0)",
            "tel:07865161123",
            "http://",
        ] {
            assert_eq!(
                classify(raw, &seed, Some(&base)),
                LinkClass::Malformed,
                "{:?} should be malformed",
                raw
            );
        }
    }

    #[test]
    fn test_relative_without_base_is_host_reference() {
        // No base: "a/b" is read as host "a"
        assert_eq!(classify("a/b", &seed(), None), LinkClass::External);
    }

    #[test]
    fn test_query_and_fragment_variants_are_distinct() {
        let seed = seed();
        let a = classify_link("/p?x=1", &seed, Some(&page()));
        let b = classify_link("/p?x=2", &seed, Some(&page()));
        let c = classify_link("/p#top", &seed, Some(&page()));
        assert_ne!(a.key, b.key);
        assert_ne!(a.key, c.key);
    }

    #[test]
    fn test_malformed_key_is_trimmed_raw() {
        let link = classify_link("  not a url ", &seed(), None);
        assert_eq!(link.class, LinkClass::Malformed);
        assert_eq!(link.key, "not a url");
        assert_eq!(link.raw, "  not a url ");
        assert!(link.url.is_none());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let seed = seed();
        let base = page();
        for raw in [
            "/a",
            "../b?q=1#f",
            "https://other.test/x",
            "HTTP://Example.COM/Path",
            "not a url",
            "mailto:x@y.z",
            "//example.com/c",
        ] {
            let first = classify_link(raw, &seed, Some(&base));
            let second = classify_link(&first.key, &seed, None);
            assert_eq!(first.class, second.class, "class changed for {:?}", raw);
            assert_eq!(first.key, second.key, "key changed for {:?}", raw);
        }
    }

    #[test]
    fn test_link_class_strings() {
        for class in [LinkClass::Local, LinkClass::External, LinkClass::Malformed] {
            assert_eq!(LinkClass::from_str_opt(class.as_str()), Some(class));
        }
        assert_eq!(LinkClass::from_str_opt("nope"), None);
    }
}
