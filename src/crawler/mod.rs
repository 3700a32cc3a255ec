//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded bodies and normalized errors
//! - HTML parsing and link extraction
//! - Frontier management with page and attempt budgets
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlFailure, CrawlReport, FailureReason, Page};
pub use fetcher::{
    build_http_client, FetchError, FetchErrorKind, FetchResponse, Fetcher, RedirectMode,
};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{CrawlTermination, Frontier, FrontierStep, QueuedUrl};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// Convenience entry point that builds a fetcher from `config` and crawls
/// `seed` with the configured page budget.
///
/// # Example
///
/// ```no_run
/// use linkscope::config::Config;
/// use linkscope::crawler::crawl;
///
/// # async fn example() -> linkscope::Result<()> {
/// let report = crawl(&Config::default(), "https://example.com/").await?;
/// println!("Collected {} pages", report.page_count());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlReport> {
    let fetcher = Fetcher::new(&config.fetcher)?;
    Coordinator::new(fetcher, config.crawler.clone())
        .crawl(seed, config.crawler.max_pages)
        .await
}
