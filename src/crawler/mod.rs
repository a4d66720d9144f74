//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind a swappable transport
//! - HTML parsing and raw link extraction
//! - A global request rate limiter
//! - The frontier that drives the crawl to completion

mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;

pub use fetcher::{
    build_http_client, same_domain_redirects, FailureReason, FetchFailure, Fetcher,
    HttpTransport, PageResult, RawResponse, Transport, TransportError, MAX_REDIRECTS,
};
pub use frontier::{CrawlEvent, Frontier, StepOutcome, StopHandle};
pub use parser::{parse_html, ParsedPage};
pub use rate_limiter::{RateLimiter, MAX_INTERVAL};

use crate::config::Config;
use crate::robots::build_policy;
use crate::state::Catalogue;
use crate::url::SeedDomain;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Requests per second when the configuration does not say otherwise
pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 2.0;

/// Facts about a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Fetch attempts for pages (robots.txt not included)
    pub pages_fetched: usize,
    /// Whether a robots.txt document was retrieved
    pub robots_found: bool,
    /// Effective minimum interval between requests
    pub request_interval: Duration,
    /// True if the crawl was stopped before the frontier emptied
    pub interrupted: bool,
}

/// The products of a crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub catalogue: Catalogue,
    pub report: CrawlReport,
}

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch robots.txt once, through the rate limiter
/// 3. Build the robots policy (allow-all if robots.txt is unavailable)
/// 4. Drive the frontier until nothing is pending
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The catalogue and a report
/// * `Err(SitewalkError)` - The seed was invalid or the HTTP client could not be built
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::load_config;
/// use sitewalk::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(&config).await?;
/// println!("{} URLs catalogued", outcome.catalogue.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> crate::Result<CrawlOutcome> {
    run_crawl_until(config, StopHandle::new()).await
}

/// Like [`run_crawl`], stopping early when `stop` is triggered
pub async fn run_crawl_until(config: &Config, stop: StopHandle) -> crate::Result<CrawlOutcome> {
    let seed = SeedDomain::parse(&config.crawler.seed_domain, &config.crawler.scheme)?;
    let transport = HttpTransport::from_config(
        &config.user_agent,
        Duration::from_secs(config.crawler.request_timeout),
        &seed,
    )?;

    crawl_with_transport(config, transport, stop).await
}

/// Runs a crawl over any transport
///
/// The transport must not follow redirects off the seed domain; see
/// [`same_domain_redirects`].
pub async fn crawl_with_transport<T: Transport>(
    config: &Config,
    transport: T,
    stop: StopHandle,
) -> crate::Result<CrawlOutcome> {
    let started_at = Utc::now();
    let seed = SeedDomain::parse(&config.crawler.seed_domain, &config.crawler.scheme)?;
    let fetcher = Fetcher::new(transport);
    let limiter = RateLimiter::per_second(config.crawler.requests_per_second);

    tracing::info!("Starting crawl of {}", seed.root_url());

    let robots_url = seed.robots_url();
    limiter.acquire().await;
    let document = match fetcher.fetch_text(&robots_url).await {
        Ok(text) => {
            tracing::debug!("Fetched {} ({} bytes)", robots_url, text.len());
            Some(text)
        }
        Err(failure) => {
            tracing::warn!(
                "robots.txt unavailable at {} ({}), allowing all paths",
                robots_url,
                failure.detail
            );
            None
        }
    };

    let policy = build_policy(config.crawler.robots_policy, document.as_deref());

    let limiter = match policy.crawl_delay() {
        Some(delay) if config.crawler.respect_crawl_delay && delay > 0.0 => {
            match Duration::try_from_secs_f64(delay) {
                Ok(min_interval) => {
                    tracing::info!("Honouring robots.txt Crawl-delay of {}s", delay);
                    limiter.at_least(min_interval)
                }
                Err(e) => {
                    tracing::warn!("Ignoring robots.txt Crawl-delay of {}s: {}", delay, e);
                    limiter
                }
            }
        }
        _ => limiter,
    };
    let request_interval = limiter.interval();

    let mut frontier = Frontier::new(seed, fetcher, Arc::new(limiter), policy)
        .with_stop_handle(stop);
    let pages_fetched = frontier.run().await;
    let interrupted = !frontier.is_done();

    let finished_at = Utc::now();
    tracing::info!(
        "Crawl completed: {} pages fetched, {} URLs catalogued in {}s",
        pages_fetched,
        frontier.catalogue().len(),
        (finished_at - started_at).num_seconds()
    );

    Ok(CrawlOutcome {
        catalogue: frontier.into_catalogue(),
        report: CrawlReport {
            started_at,
            finished_at,
            pages_fetched,
            robots_found: document.is_some(),
            request_interval,
            interrupted,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, RobotsPolicyKind, UserAgentConfig};
    use crate::state::UrlStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::Instant;
    use url::Url;

    fn create_test_config(rate: f64, respect_crawl_delay: bool) -> Config {
        Config {
            crawler: CrawlerConfig {
                seed_domain: "example.test".to_string(),
                scheme: "https".to_string(),
                requests_per_second: rate,
                request_timeout: 5,
                respect_crawl_delay,
                robots_policy: RobotsPolicyKind::Generic,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./test.db".to_string(),
                summary_path: "./summary.md".to_string(),
            },
        }
    }

    /// Serves fixed bodies by URL and records when each request arrived
    #[derive(Clone, Default)]
    struct TimedSite {
        bodies: Arc<HashMap<String, String>>,
        requests: Arc<Mutex<Vec<(String, Instant)>>>,
    }

    impl TimedSite {
        fn new(bodies: &[(&str, &str)]) -> Self {
            Self {
                bodies: Arc::new(
                    bodies
                        .iter()
                        .map(|(url, body)| (url.to_string(), body.to_string()))
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn requests(&self) -> Vec<(String, Instant)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for TimedSite {
        async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), Instant::now()));

            let (status, body) = match self.bodies.get(url.as_str()) {
                Some(body) => (200, body.clone()),
                None => (404, String::new()),
            };

            Ok(RawResponse {
                status,
                final_url: url.clone(),
                content_type: None,
                body,
            })
        }
    }

    #[tokio::test]
    async fn test_every_request_goes_through_limiter() {
        let site = TimedSite::new(&[
            ("https://example.test/robots.txt", "User-agent: *\nAllow: /\n"),
            ("https://example.test/", r#"<a href="/a">a</a><a href="/b">b</a>"#),
            ("https://example.test/a", ""),
            ("https://example.test/b", ""),
        ]);

        let outcome = crawl_with_transport(
            &create_test_config(20.0, true),
            site.clone(),
            StopHandle::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.request_interval, Duration::from_millis(50));

        // Timestamps are taken just after each grant, so allow a little jitter
        let requests = site.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].0, "https://example.test/robots.txt");
        for pair in requests.windows(2) {
            let gap = pair[1].1 - pair[0].1;
            assert!(
                gap >= Duration::from_millis(45),
                "{} followed {} after only {:?}",
                pair[1].0,
                pair[0].0,
                gap
            );
        }
    }

    #[tokio::test]
    async fn test_crawl_delay_lengthens_interval() {
        let site = TimedSite::new(&[
            (
                "https://example.test/robots.txt",
                "User-agent: *\nCrawl-delay: 0.2\n",
            ),
            ("https://example.test/", ""),
        ]);

        let outcome = crawl_with_transport(
            &create_test_config(100.0, true),
            site.clone(),
            StopHandle::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.request_interval, Duration::from_millis(200));

        let requests = site.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].1 - requests[0].1 >= Duration::from_millis(190));
    }

    #[tokio::test]
    async fn test_crawl_delay_ignored_when_disabled() {
        let site = TimedSite::new(&[
            (
                "https://example.test/robots.txt",
                "User-agent: *\nCrawl-delay: 30\n",
            ),
            ("https://example.test/", ""),
        ]);

        let outcome = crawl_with_transport(
            &create_test_config(100.0, false),
            site,
            StopHandle::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.report.request_interval, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_oversized_crawl_delay_is_ignored() {
        let site = TimedSite::new(&[
            (
                "https://example.test/robots.txt",
                "User-agent: *\nCrawl-delay: 1e300\n",
            ),
            ("https://example.test/", r#"<a href="/a">a</a>"#),
            ("https://example.test/a", ""),
        ]);

        let outcome = crawl_with_transport(
            &create_test_config(100.0, true),
            site,
            StopHandle::new(),
        )
        .await
        .unwrap();

        assert!(outcome.report.robots_found);
        assert_eq!(outcome.report.request_interval, Duration::from_millis(10));
        assert_eq!(
            outcome
                .catalogue
                .get("https://example.test/a")
                .map(|r| r.status),
            Some(UrlStatus::Visited)
        );
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let site = TimedSite::new(&[("https://example.test/", "")]);

        let outcome = crawl_with_transport(
            &create_test_config(100.0, true),
            site,
            StopHandle::new(),
        )
        .await
        .unwrap();

        assert!(!outcome.report.robots_found);
        assert!(!outcome.report.interrupted);
        assert_eq!(outcome.report.pages_fetched, 1);
    }
}
