use url::Url;

/// Identifier used for the site root
pub const HOME_PAGE_ID: &str = "home";

/// Derives a short page identifier from a URL
///
/// The identifier is the lowercased path without surrounding slashes, or
/// `"home"` for the root page.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkscope::url::page_id_from_url;
///
/// assert_eq!(page_id_from_url(&Url::parse("https://example.com/").unwrap()), "home");
/// assert_eq!(page_id_from_url(&Url::parse("https://example.com/Blog/Post/").unwrap()), "blog/post");
/// ```
pub fn page_id_from_url(url: &Url) -> String {
    slug_from_path(url.path())
}

/// Derives a page identifier from either an absolute URL or a bare slug
pub fn page_id(input: &str) -> String {
    match Url::parse(input) {
        Ok(url) if url.has_host() => page_id_from_url(&url),
        _ => slug_from_path(input.split(['?', '#']).next().unwrap_or("")),
    }
}

fn slug_from_path(path: &str) -> String {
    let slug = path.trim_matches('/').to_lowercase();
    if slug.is_empty() {
        HOME_PAGE_ID.to_string()
    } else {
        slug
    }
}
