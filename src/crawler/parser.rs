//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Hyperlink targets, resolved to absolute URLs
//! - Page title

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs, document order)
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts links and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` and `<area href="...">`
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - hrefs that fail to resolve, or resolve to a non-HTTP(S) URL
///
/// Fragment-only links (`#section`) resolve to the base page itself; callers
/// that only care about distinct pages deduplicate them by page identity.
///
/// # Example
///
/// ```
/// use linkscope::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let links = collect_hrefs(&document)
        .iter()
        .filter_map(|href| resolve_link(href, base_url))
        .collect();

    ParsedPage { title, links }
}

/// Yields the absolute link targets of an HTML document
///
/// The document is parsed once up front; resolution against `base_url`
/// happens lazily as the iterator is consumed. Calling it again with the same
/// input yields the same sequence.
///
/// # Example
///
/// ```
/// use linkscope::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/blog/").unwrap();
/// let html = r#"<a href="post">Post</a><a href="mailto:me@example.com">Mail</a>"#;
/// let links: Vec<String> = extract_links(&base, html).map(String::from).collect();
/// assert_eq!(links, vec!["https://example.com/blog/post"]);
/// ```
pub fn extract_links(base_url: &Url, html: &str) -> impl Iterator<Item = Url> {
    let hrefs = collect_hrefs(&Html::parse_document(html));
    let base_url = base_url.clone();

    hrefs
        .into_iter()
        .filter_map(move |href| resolve_link(&href, &base_url))
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

/// Collects raw href values from link-bearing elements, in document order
fn collect_hrefs(document: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("a[href], area[href], link[rel='canonical'][href]") {
        for element in document.select(&selector) {
            if element.value().name() == "a" && element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.to_string());
            }
        }
    }

    hrefs
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if crate::url::is_http(&absolute_url) => Some(absolute_url),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!("Skipping unparsable href {:?}: {}", href, e);
            None
        }
    }
}
