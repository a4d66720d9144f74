//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Mapping transport errors onto fetch failure reasons
//! - Extracting raw links and titles from HTML responses
//!
//! The network itself sits behind the [`Transport`] trait so the crawl loop can
//! run against in-memory sites in tests.

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::url::SeedDomain;
use reqwest::{header::CONTENT_TYPE, redirect, Client};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A response as delivered by a transport, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// URL the body was served from, after any redirects were followed
    pub final_url: Url,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Decoded body text
    pub body: String,
}

/// Errors raised by a transport before a usable response exists
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("failed to decode body: {0}")]
    Decode(String),
}

/// Anything that can perform a single GET request
pub trait Transport: Send + Sync {
    /// Sends one GET request; never retries
    fn get(&self, url: &Url) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Redirect hops followed before a request fails
pub const MAX_REDIRECTS: usize = 10;

/// Redirect policy that only follows hops staying inside the seed domain
///
/// A hop to any other host is not followed: the 3xx response itself is
/// returned, so external URLs are never requested.
pub fn same_domain_redirects(seed: &SeedDomain) -> redirect::Policy {
    let seed = seed.clone();
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if seed.contains(attempt.url()) {
            attempt.follow()
        } else {
            tracing::debug!(
                "Not following redirect to {} (outside {})",
                attempt.url(),
                seed.host()
            );
            attempt.stop()
        }
    })
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall per-request timeout
/// * `seed` - Redirects are only followed within this domain
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::UserAgentConfig;
/// use sitewalk::crawler::build_http_client;
/// use sitewalk::url::SeedDomain;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "sitewalk".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let seed = SeedDomain::parse("example.com", "https").unwrap();
/// let client = build_http_client(&config, Duration::from_secs(30), &seed).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    seed: &SeedDomain,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(same_domain_redirects(seed))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] over a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the user agent configuration
    pub fn from_config(
        config: &UserAgentConfig,
        timeout: Duration,
        seed: &SeedDomain,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout, seed)?))
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Decode(e.to_string())
            }
        })?;

        Ok(RawResponse {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

/// Why a fetch produced no page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Timeout,
    ConnectionError,
    NonSuccessStatus(u16),
    DecodeError,
}

impl FailureReason {
    /// Returns the stable string form used in storage and reports
    pub fn to_db_string(&self) -> String {
        match self {
            Self::Timeout => "timeout".to_string(),
            Self::ConnectionError => "connection-error".to_string(),
            Self::NonSuccessStatus(code) => format!("status-{}", code),
            Self::DecodeError => "decode-error".to_string(),
        }
    }

    /// Parses the string form produced by [`FailureReason::to_db_string`]
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "timeout" => Some(Self::Timeout),
            "connection-error" => Some(Self::ConnectionError),
            "decode-error" => Some(Self::DecodeError),
            other => other
                .strip_prefix("status-")
                .and_then(|code| code.parse().ok())
                .map(Self::NonSuccessStatus),
        }
    }

    /// HTTP status code, when the failure carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NonSuccessStatus(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_db_string())
    }
}

impl From<&TransportError> for FailureReason {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::Timeout(_) => Self::Timeout,
            TransportError::Connection(_) => Self::ConnectionError,
            TransportError::Decode(_) => Self::DecodeError,
        }
    }
}

/// A failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub reason: FailureReason,
    /// Human-readable detail for logs
    pub detail: String,
}

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub status: u16,
    /// Where the page was actually served from; relative links resolve against it
    pub final_url: Url,
    pub body: String,
    pub title: Option<String>,
    /// Raw href strings, unresolved, in document order
    pub links: Vec<String>,
}

/// Retrieves pages through a transport and extracts their links
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetches a page, making exactly one attempt
    ///
    /// # Returns
    ///
    /// * `Ok(PageResult)` - 2xx response; links are extracted when the body is HTML
    /// * `Err(FetchFailure)` - Timeout, connection error, non-2xx status or undecodable body
    pub async fn fetch(&self, url: &Url) -> Result<PageResult, FetchFailure> {
        let response = self.get_success(url).await?;

        let parsed = if is_html(response.content_type.as_deref()) {
            parse_html(&response.body)
        } else {
            tracing::debug!(
                "Not extracting links from {} (content type {:?})",
                url,
                response.content_type
            );
            Default::default()
        };

        Ok(PageResult {
            status: response.status,
            final_url: response.final_url,
            body: response.body,
            title: parsed.title,
            links: parsed.links,
        })
    }

    /// Fetches a plain-text resource such as robots.txt
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchFailure> {
        Ok(self.get_success(url).await?.body)
    }

    async fn get_success(&self, url: &Url) -> Result<RawResponse, FetchFailure> {
        let response = self.transport.get(url).await.map_err(|e| FetchFailure {
            reason: FailureReason::from(&e),
            detail: e.to_string(),
        })?;

        if !(200..300).contains(&response.status) {
            return Err(FetchFailure {
                reason: FailureReason::NonSuccessStatus(response.status),
                detail: format!("HTTP {}", response.status),
            });
        }

        Ok(response)
    }
}

/// Returns true when a Content-Type is absent or names an HTML document
fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml+xml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    /// Answers every request with the same canned result
    struct CannedTransport(fn() -> Result<RawResponse, TransportError>);

    impl Transport for CannedTransport {
        async fn get(&self, _url: &Url) -> Result<RawResponse, TransportError> {
            (self.0)()
        }
    }

    fn url() -> Url {
        Url::parse("https://example.test/").unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let seed = SeedDomain::parse("example.com", "https").unwrap();
        assert!(build_http_client(&config, Duration::from_secs(5), &seed).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_html_extracts_links() {
        let fetcher = Fetcher::new(CannedTransport(|| {
            Ok(RawResponse {
                status: 200,
                final_url: url(),
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: r#"<title>Home</title><a href="/a">a</a><a href="not a url">x</a>"#
                    .to_string(),
            })
        }));

        let page = fetcher.fetch(&url()).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.final_url, url());
        assert_eq!(page.title.as_deref(), Some("Home"));
        assert_eq!(page.links, vec!["/a", "not a url"]);
    }

    #[tokio::test]
    async fn test_fetch_reports_final_url() {
        let fetcher = Fetcher::new(CannedTransport(|| {
            Ok(RawResponse {
                status: 200,
                final_url: Url::parse("https://example.test/docs/").unwrap(),
                content_type: None,
                body: r#"<a href="intro.html">intro</a>"#.to_string(),
            })
        }));

        let requested = Url::parse("https://example.test/docs").unwrap();
        let page = fetcher.fetch(&requested).await.unwrap();
        assert_eq!(page.final_url.as_str(), "https://example.test/docs/");
        assert_eq!(page.links, vec!["intro.html"]);
    }

    #[tokio::test]
    async fn test_fetch_non_html_has_no_links() {
        let fetcher = Fetcher::new(CannedTransport(|| {
            Ok(RawResponse {
                status: 200,
                final_url: url(),
                content_type: Some("application/pdf".to_string()),
                body: r#"<a href="/a">a</a>"#.to_string(),
            })
        }));

        let page = fetcher.fetch(&url()).await.unwrap();
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let fetcher = Fetcher::new(CannedTransport(|| {
            Ok(RawResponse {
                status: 404,
                final_url: url(),
                content_type: None,
                body: String::new(),
            })
        }));

        let failure = fetcher.fetch(&url()).await.unwrap_err();
        assert_eq!(failure.reason, FailureReason::NonSuccessStatus(404));
    }

    #[tokio::test]
    async fn test_fetch_transport_errors() {
        let fetcher = Fetcher::new(CannedTransport(|| {
            Err(TransportError::Timeout("deadline".to_string()))
        }));
        assert_eq!(
            fetcher.fetch(&url()).await.unwrap_err().reason,
            FailureReason::Timeout
        );

        let fetcher = Fetcher::new(CannedTransport(|| {
            Err(TransportError::Connection("refused".to_string()))
        }));
        assert_eq!(
            fetcher.fetch_text(&url()).await.unwrap_err().reason,
            FailureReason::ConnectionError
        );

        let fetcher = Fetcher::new(CannedTransport(|| {
            Err(TransportError::Decode("bad bytes".to_string()))
        }));
        assert_eq!(
            fetcher.fetch(&url()).await.unwrap_err().reason,
            FailureReason::DecodeError
        );
    }

    #[test]
    fn test_failure_reason_strings() {
        for reason in [
            FailureReason::Timeout,
            FailureReason::ConnectionError,
            FailureReason::NonSuccessStatus(503),
            FailureReason::DecodeError,
        ] {
            assert_eq!(
                FailureReason::from_db_string(&reason.to_db_string()),
                Some(reason)
            );
        }
        assert_eq!(FailureReason::from_db_string("status-abc"), None);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(None));
        assert!(is_html(Some("text/html")));
        assert!(is_html(Some("TEXT/HTML; charset=UTF-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("text/plain")));
        assert!(!is_html(Some("image/png")));
    }
}
