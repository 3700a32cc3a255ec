use serde::Deserialize;

/// Default user agent sent with every request
///
/// A realistic browser-style string; some sites refuse obvious bot agents
/// outright, which would turn every link into a false positive.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Linkscope/0.1)";

/// Main configuration structure for Linkscope
///
/// Every section is optional; missing sections and keys fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub crawler: CrawlerConfig,
    pub validator: ValidatorConfig,
    pub redirects: RedirectConfig,
    pub suggest: SuggestConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Largest response body that will be read
    #[serde(rename = "max-body-bytes")]
    pub max_body_bytes: usize,

    /// Redirects followed automatically when following is enabled
    #[serde(rename = "max-auto-redirects")]
    pub max_auto_redirects: usize,

    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_body_bytes: 5 * 1024 * 1024,
            max_auto_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages collected per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Hard ceiling on fetch attempts; defaults to four times `max-pages`
    #[serde(rename = "max-attempts")]
    pub max_attempts: Option<usize>,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "request-spacing-ms")]
    pub request_spacing_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_attempts: None,
            request_spacing_ms: 250,
        }
    }
}

impl CrawlerConfig {
    /// Attempt ceiling for a crawl collecting at most `max_pages` pages
    pub fn attempt_ceiling(&self, max_pages: usize) -> usize {
        self.max_attempts
            .unwrap_or_else(|| max_pages.saturating_mul(4))
            .max(max_pages)
    }
}

/// Link validator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum number of link checks in flight at once
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { max_concurrent: 20 }
    }
}

/// Redirect resolver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Maximum number of requests issued while following a chain
    #[serde(rename = "max-hops")]
    pub max_hops: usize,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self { max_hops: 10 }
    }
}

/// Link suggestion configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Suggested targets per page
    #[serde(rename = "top-n")]
    pub top_n: usize,

    /// Internal pages taken from a single page when building a slug graph
    #[serde(rename = "max-links")]
    pub max_links: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            max_links: 10,
        }
    }
}
