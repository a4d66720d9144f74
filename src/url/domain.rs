use crate::ConfigError;
use url::Url;

/// The domain being crawled, together with the scheme used to reach it
///
/// A seed is written as `host` or `host:port` (no scheme, no path). Links are
/// local when their host matches the seed host (case-insensitive, ignoring a
/// trailing dot), whatever their scheme. A seed with an explicit port also
/// requires the link's effective port to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDomain {
    host: String,
    root: Url,
}

impl SeedDomain {
    /// Parses a seed domain
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain, e.g. `"example.com"` or `"127.0.0.1:8080"`
    /// * `scheme` - `"http"` or `"https"`
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewalk::url::SeedDomain;
    ///
    /// let seed = SeedDomain::parse("Example.COM", "https").unwrap();
    /// assert_eq!(seed.host(), "example.com");
    /// assert_eq!(seed.root_url().as_str(), "https://example.com/");
    /// assert_eq!(seed.robots_url().as_str(), "https://example.com/robots.txt");
    /// ```
    pub fn parse(domain: &str, scheme: &str) -> Result<Self, ConfigError> {
        let domain = domain.trim();

        if domain.is_empty() {
            return Err(ConfigError::InvalidSeed(
                "seed domain cannot be empty".to_string(),
            ));
        }

        if domain.contains("://") {
            return Err(ConfigError::InvalidSeed(format!(
                "seed domain '{}' must not include a scheme",
                domain
            )));
        }

        if domain
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@' | '\\'))
        {
            return Err(ConfigError::InvalidSeed(format!(
                "seed domain '{}' must be a bare host or host:port",
                domain
            )));
        }

        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::InvalidSeed(format!(
                "unsupported scheme '{}'",
                scheme
            )));
        }

        let root = Url::parse(&format!("{}://{}/", scheme, domain))
            .map_err(|e| ConfigError::InvalidSeed(format!("'{}': {}", domain, e)))?;

        let host = match root.host_str() {
            Some(h) if !h.is_empty() => normalize_host(h),
            _ => return Err(ConfigError::InvalidSeed(format!("'{}' has no host", domain))),
        };

        Ok(Self { host, root })
    }

    /// Lowercased host without a trailing dot
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Scheme used for the seed and for scheme-less links
    pub fn scheme(&self) -> &str {
        self.root.scheme()
    }

    /// The seed URL, `{scheme}://{domain}/`
    pub fn root_url(&self) -> &Url {
        &self.root
    }

    /// Location of the robots-exclusion document
    pub fn robots_url(&self) -> Url {
        let mut url = self.root.clone();
        url.set_path("/robots.txt");
        url
    }

    /// Returns true if the URL belongs to this domain
    pub fn contains(&self, url: &Url) -> bool {
        let same_host = url
            .host_str()
            .map(|h| normalize_host(h) == self.host)
            .unwrap_or(false);

        match self.root.port() {
            Some(port) => same_host && url.port_or_known_default() == Some(port),
            None => same_host,
        }
    }
}

/// Lowercases a host and strips a trailing dot
pub fn normalize_host(host: &str) -> String {
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Extracts the normalized host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewalk::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM./path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(normalize_host)
}
