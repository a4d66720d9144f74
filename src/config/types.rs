use serde::Deserialize;

/// Main configuration structure for Sitewalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Domain to crawl, as `host` or `host:port`
    #[serde(rename = "seed-domain")]
    pub seed_domain: String,

    /// URL scheme used for the seed and for scheme-less links
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Global request budget (requests per second)
    #[serde(rename = "requests-per-second", default = "default_rate")]
    pub requests_per_second: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_timeout")]
    pub request_timeout: u64,

    /// Stretch the request interval to the robots.txt Crawl-delay when it is longer
    #[serde(rename = "respect-crawl-delay", default = "default_true")]
    pub respect_crawl_delay: bool,

    /// Which robots.txt evaluator to use
    #[serde(rename = "robots-policy", default)]
    pub robots_policy: RobotsPolicyKind,
}

/// Selects the robots.txt evaluator at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsPolicyKind {
    /// Wildcard-agent evaluator tuned for this crawler
    #[default]
    Generic,
    /// General-purpose evaluator backed by the `robotstxt` crate
    Standard,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_rate() -> f64 {
    crate::crawler::DEFAULT_REQUESTS_PER_SECOND
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
