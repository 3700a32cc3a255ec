//! Concurrent link validation
//!
//! Every URL is checked on its own task. A semaphore bounds how many checks
//! are in flight; each request carries the fetcher's own timeout. Results are
//! collected through a join barrier, so the batch completes once every URL
//! has answered, failed, or timed out. Dropping the returned future aborts
//! all outstanding checks.

mod outcome;

pub use outcome::{Outcome, ValidationReport, ValidationResult};

use crate::crawler::{extract_links, FetchErrorKind, Fetcher, RedirectMode};
use crate::url::is_http;
use crate::{LinkscopeError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Validates a batch of links concurrently
///
/// # Arguments
///
/// * `fetcher` - Fetcher used for every check (redirects are followed)
/// * `urls` - Absolute URLs to check; duplicates are checked independently
/// * `max_concurrent` - Maximum number of checks in flight at once
///
/// # Returns
///
/// A report with exactly one result per input URL. Order is not preserved.
pub async fn validate_links(
    fetcher: &Fetcher,
    urls: Vec<String>,
    max_concurrent: usize,
) -> ValidationReport {
    let total = urls.len();
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();
    let mut pending: HashMap<usize, String> = HashMap::with_capacity(total);
    let mut results = Vec::with_capacity(total);

    tracing::info!(
        "Validating {} links (max {} concurrent)",
        total,
        max_concurrent.max(1)
    );

    for (index, raw) in urls.into_iter().enumerate() {
        let url = match parse_target(&raw) {
            Ok(url) => url,
            Err(reason) => {
                tracing::debug!("Skipping invalid link {:?}: {}", raw, reason);
                results.push(ValidationResult {
                    url: raw,
                    outcome: Outcome::InvalidUrl { reason },
                });
                continue;
            }
        };

        pending.insert(index, raw.clone());
        let fetcher = fetcher.clone();
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            // Acquisition only fails on a closed semaphore; this one never is
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = match fetcher.probe(&url).await {
                Ok(status_code) => Outcome::Status { status_code },
                Err(error) => Outcome::from(error),
            };
            (index, ValidationResult { url: raw, outcome })
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                pending.remove(&index);
                tracing::trace!("{} -> {}", result.url, result.outcome);
                results.push(result);
            }
            Err(e) => tracing::warn!("Link check task failed: {}", e),
        }
    }

    // Tasks that panicked still owe a result for their URL
    for (_, url) in pending {
        results.push(ValidationResult {
            url,
            outcome: Outcome::Error {
                error_kind: FetchErrorKind::Request,
                reason: "link check did not complete".to_string(),
            },
        });
    }

    let report = ValidationReport { results };
    tracing::info!(
        "Validation complete: {} valid, {} broken",
        report.valid_count(),
        report.broken_count()
    );
    report
}

fn parse_target(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !is_http(&url) {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    Ok(url)
}

/// Result of checking every link on one page
#[derive(Debug, Clone, Serialize)]
pub struct PageLinkReport {
    /// The page the links were taken from
    pub page_url: String,

    /// Number of links found on the page
    pub total_links: usize,

    /// Per-link results
    pub report: ValidationReport,
}

/// Fetches a page, extracts every link on it, and validates them all
///
/// # Errors
///
/// The page itself must be reachable: an invalid URL, a fetch failure, or a
/// non-2xx status aborts the operation. Failures of the extracted links are
/// reported per link.
pub async fn check_page(
    fetcher: &Fetcher,
    page_url: &str,
    max_concurrent: usize,
) -> Result<PageLinkReport> {
    let url = Url::parse(page_url.trim())?;
    if !is_http(&url) {
        return Err(crate::UrlError::InvalidScheme(url.scheme().to_string()).into());
    }

    let response = fetcher.fetch(&url, RedirectMode::Follow).await?;
    if !response.is_success() {
        return Err(LinkscopeError::HttpStatus {
            url: url.to_string(),
            status_code: response.status_code,
        });
    }

    let links: Vec<String> = extract_links(&response.final_url, &response.body)
        .map(String::from)
        .collect();
    tracing::info!("Found {} links on {}", links.len(), url);

    let total_links = links.len();
    let report = validate_links(fetcher, links, max_concurrent).await;

    Ok(PageLinkReport {
        page_url: url.to_string(),
        total_links,
        report,
    })
}
