//! HTML parser for extracting links and metadata
//!
//! Links are returned exactly as written in the markup. Resolution and
//! classification happen later, against the page URL.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from the first `<title>` tag)
    pub title: Option<String>,

    /// Raw href strings, in document order, duplicates included
    pub links: Vec<String>,
}

/// Parses HTML content and extracts raw links and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `<link>` elements other than canonical, `<script src>`, `<img src>`
///
/// No filtering by scheme happens here: `mailto:` and garbage hrefs are
/// returned so they can be catalogued as malformed.
///
/// # Example
///
/// ```
/// use sitewalk::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href], link[rel='canonical'][href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            element.value().name() != "a" || element.value().attr("download").is_none()
        })
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(parse_html(html).title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(parse_html(html).title, None);
    }

    #[test]
    fn test_links_kept_raw_and_in_order() {
        let html = r#"
            <html>
            <body>
                <a href="/a">A</a>
                <a href="https://other.test/x">X</a>
                <a href="not a url">broken</a>
                <a href="/a">A again</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html);
        assert_eq!(
            parsed.links,
            vec!["/a", "https://other.test/x", "not a url", "/a"]
        );
    }

    #[test]
    fn test_special_schemes_are_returned() {
        let html = r#"<a href="mailto:test@example.com">Email</a><a href="tel:123">Call</a>"#;
        assert_eq!(parse_html(html).links.len(), 2);
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        assert!(parse_html(html).links.is_empty());
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<html><body><a name="top">Top</a></body></html>"#;
        assert!(parse_html(html).links.is_empty());
    }

    #[test]
    fn test_canonical_link_in_document_order() {
        let html = r#"<html><head><link rel="stylesheet" href="/style.css"><link rel="canonical" href="https://example.com/canonical" /></head><body><a href="/b">B</a></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.links, vec!["https://example.com/canonical", "/b"]);
    }

    #[test]
    fn test_non_html_text_yields_nothing() {
        let parsed = parse_html("User-agent: *\nDisallow: /");
        assert!(parsed.links.is_empty());
        assert_eq!(parsed.title, None);
    }
}
