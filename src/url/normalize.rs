use crate::UrlError;
use url::{ParseError, Url};

/// Resolves a raw link string into an absolute HTTP(S) URL
///
/// # Resolution Steps
///
/// 1. Trim surrounding whitespace; reject empty strings
/// 2. Reject strings with embedded whitespace or control characters
/// 3. Absolute references must use `http` or `https`
///    (`mailto:`, `javascript:`, `tel:`, `data:` are rejected)
/// 4. Scheme-relative references (`//host/path`) take `default_scheme`
/// 5. Other relative references are joined onto `base` when one is given;
///    without a base, `default_scheme://` is prefixed
/// 6. The result must carry a non-empty host
///
/// The returned URL keeps its query and fragment. Its serialization
/// (`Url::as_str`) is the identity key of the link.
///
/// # Examples
///
/// ```
/// use sitewalk::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = resolve_link("../about?x=1#team", "https", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about?x=1#team");
///
/// assert!(resolve_link("not a url", "https", Some(&base)).is_err());
/// assert!(resolve_link("mailto:me@example.com", "https", Some(&base)).is_err());
/// ```
pub fn resolve_link(raw: &str, default_scheme: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty link".to_string()));
    }

    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(UrlError::Parse(format!(
            "link contains whitespace or control characters: {:?}",
            trimmed
        )));
    }

    let resolved = match Url::parse(trimmed) {
        Ok(absolute) => absolute,
        Err(ParseError::RelativeUrlWithoutBase) => resolve_relative(trimmed, default_scheme, base)?,
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(resolved.scheme().to_string()));
    }

    match resolved.host_str() {
        Some(host) if !host.is_empty() => Ok(resolved),
        _ => Err(UrlError::MissingDomain),
    }
}

fn resolve_relative(
    reference: &str,
    default_scheme: &str,
    base: Option<&Url>,
) -> Result<Url, UrlError> {
    let result = if reference.starts_with("//") {
        Url::parse(&format!("{}:{}", default_scheme, reference))
    } else if let Some(base) = base {
        base.join(reference)
    } else {
        Url::parse(&format!("{}://{}", default_scheme, reference))
    };

    result.map_err(|e| UrlError::Parse(e.to_string()))
}

/// Returns the part of a URL that robots.txt rules are matched against:
/// the path, followed by `?query` when a query is present
///
/// # Examples
///
/// ```
/// use sitewalk::url::robots_path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/search?q=rust#top").unwrap();
/// assert_eq!(robots_path(&url), "/search?q=rust");
/// ```
pub fn robots_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
