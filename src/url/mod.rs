//! URL handling module for Linkscope
//!
//! This module provides page identity (normalization), origin comparison,
//! host extraction for request spacing, and slug-style page identifiers.

mod domain;
mod normalize;
mod slug;

pub use domain::extract_host;
pub use normalize::{canonicalize, normalize_url};
pub use slug::{page_id, page_id_from_url, HOME_PAGE_ID};

use url::Url;

/// Returns true if both URLs share scheme, host and port
///
/// Default ports are taken into account, so `http://a.test/` and
/// `http://a.test:80/` are the same origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkscope::url::same_origin;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// assert!(same_origin(&seed, &Url::parse("https://example.com:443/blog").unwrap()));
/// assert!(!same_origin(&seed, &Url::parse("http://example.com/").unwrap()));
/// assert!(!same_origin(&seed, &Url::parse("https://blog.example.com/").unwrap()));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Returns true if the URL uses a scheme the fetcher can request
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
