//! Crawl coordinator - bounded same-origin site traversal
//!
//! This module contains the crawl loop, which:
//! - Pulls URLs from the frontier in breadth-first order
//! - Paces requests per host
//! - Fetches each page once, following redirects
//! - Extracts same-origin links into the frontier
//! - Records failures without aborting the crawl

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, FetchErrorKind, FetchResponse, Fetcher, RedirectMode};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{CrawlTermination, Frontier, FrontierStep, QueuedUrl};
use crate::state::HostPacer;
use crate::url::{canonicalize, normalize_url, page_id_from_url, same_origin};
use crate::{LinkscopeError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Normalized URL of the content after redirects; the page identity
    pub url: String,

    /// URL the content was served from after redirects
    pub final_url: String,

    /// HTTP status code (always 2xx)
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Page title (from <title> tag)
    pub title: Option<String>,

    /// Raw response body
    pub body: String,

    /// Distinct same-origin page identities this page links to
    pub links: Vec<String>,

    /// Link distance from the seed
    pub depth: u32,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Why a page was left out of the crawl result
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The server answered with a non-2xx status
    HttpStatus { status_code: u16 },
    /// No response was received
    Fetch {
        error_kind: FetchErrorKind,
        reason: String,
    },
    /// A followed redirect left the seed's origin
    OffOrigin { final_url: String },
    /// A followed redirect landed on a page that was already collected or
    /// queued under its own address
    Alias { final_url: String },
}

/// A page that was attempted but not collected
#[derive(Debug, Clone, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub reason: FailureReason,
}

/// Result of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Normalized seed URL
    ///
    /// If the seed itself redirected to another origin, this is where it
    /// landed; the crawl was confined to that origin.
    pub seed: String,

    /// Collected pages keyed by page identity
    pub pages: BTreeMap<String, Page>,

    /// Attempted pages that were not collected
    pub failures: Vec<CrawlFailure>,

    /// Total fetch attempts
    pub attempts: usize,

    /// Why the crawl stopped
    pub termination: CrawlTermination,
}

impl CrawlReport {
    /// Number of collected pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if the crawl stopped because the page budget was filled
    pub fn budget_exhausted(&self) -> bool {
        self.termination == CrawlTermination::PageBudgetReached
    }

    /// Internal link edges between collected pages
    ///
    /// Each unordered pair appears once; self-links and links to pages that
    /// were not collected are omitted. Endpoints are page identities.
    pub fn link_edges(&self) -> Vec<(String, String)> {
        let mut edges = BTreeSet::new();

        for (source, page) in &self.pages {
            for target in &page.links {
                if target == source || !self.pages.contains_key(target) {
                    continue;
                }
                edges.insert(ordered_pair(source.clone(), target.clone()));
            }
        }

        edges.into_iter().collect()
    }

    /// Internal link edges expressed as slug-style page ids
    ///
    /// See [`page_id_from_url`]. Pages whose ids collide are merged.
    pub fn slug_edges(&self) -> Vec<(String, String)> {
        let mut edges = BTreeSet::new();

        for (source, target) in self.link_edges() {
            let (Some(a), Some(b)) = (slug_of(&source), slug_of(&target)) else {
                continue;
            };
            if a != b {
                edges.insert(ordered_pair(a, b));
            }
        }

        edges.into_iter().collect()
    }

    /// Slug-style page ids of all collected pages, in identity order
    pub fn page_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = Vec::new();
        for url in self.pages.keys() {
            if let Some(slug) = slug_of(url) {
                if !slugs.contains(&slug) {
                    slugs.push(slug);
                }
            }
        }
        slugs
    }
}

fn ordered_pair(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn slug_of(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| page_id_from_url(&u))
}

/// Drives a single crawl
///
/// Strictly sequential: each fetch is awaited and consumed before the next
/// one starts. Owns its frontier and pacer exclusively for the duration of
/// [`Coordinator::crawl`].
pub struct Coordinator {
    fetcher: Fetcher,
    config: CrawlerConfig,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher used for every page request
    /// * `config` - Crawl limits and request spacing
    pub fn new(fetcher: Fetcher, config: CrawlerConfig) -> Self {
        Self { fetcher, config }
    }

    /// Crawls the site behind `seed`, collecting at most `max_pages` pages
    ///
    /// # Errors
    ///
    /// Fails only if the crawl cannot start: an unparsable or non-HTTP(S)
    /// seed, or a zero page budget. Per-page failures are reported in
    /// [`CrawlReport::failures`].
    pub async fn crawl(&self, seed: &str, max_pages: usize) -> Result<CrawlReport> {
        if max_pages == 0 {
            return Err(LinkscopeError::InvalidParameter(
                "max_pages must be at least 1".to_string(),
            ));
        }

        let seed = normalize_url(seed)?;
        let max_attempts = self.config.attempt_ceiling(max_pages);

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} attempts)",
            seed,
            max_pages,
            max_attempts
        );

        let mut frontier = Frontier::new(seed.clone(), max_pages, max_attempts);
        let mut pacer = HostPacer::new(Duration::from_millis(self.config.request_spacing_ms));
        let mut pages: BTreeMap<String, Page> = BTreeMap::new();
        let mut failures: Vec<CrawlFailure> = Vec::new();

        let termination = loop {
            let queued = match frontier.next(pages.len()) {
                FrontierStep::Fetch(queued) => queued,
                FrontierStep::Done(termination) => break termination,
            };

            pacer.wait_turn(&queued.host).await;
            tracing::debug!("Fetching {} (depth {})", queued.url, queued.depth);

            match self.fetcher.fetch(&queued.url, RedirectMode::Follow).await {
                Ok(response) => {
                    if queued.depth == 0
                        && response.is_success()
                        && !same_origin(frontier.seed(), &response.final_url)
                        && frontier.rebase(&response.final_url)
                    {
                        tracing::info!(
                            "Seed {} redirected to {}; crawling that origin instead",
                            queued.url,
                            frontier.seed()
                        );
                    }

                    match self.process_response(&queued, response, &mut frontier) {
                        Ok(page) => {
                            pages.insert(page.url.clone(), page);
                        }
                        Err(failure) => failures.push(failure),
                    }
                }
                Err(error) => {
                    tracing::debug!("{}", error);
                    failures.push(fetch_failure(&queued, error));
                }
            }

            if frontier.attempts() % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages collected, {} in frontier, {} attempts",
                    pages.len(),
                    frontier.len(),
                    frontier.attempts()
                );
            }
        };

        tracing::info!(
            "Crawl of {} finished: {} pages, {} failures, {} attempts ({:?})",
            frontier.seed(),
            pages.len(),
            failures.len(),
            frontier.attempts(),
            termination
        );
        tracing::debug!(
            "Sent {} requests to {} hosts",
            pacer.total_requests(),
            pacer.host_count()
        );

        Ok(CrawlReport {
            seed: frontier.seed().to_string(),
            pages,
            failures,
            attempts: frontier.attempts(),
            termination,
        })
    }

    /// Turns a response into a page and expands its links
    ///
    /// The page is keyed by the identity of its final URL. A redirect onto a
    /// page the frontier already knows is reported as an alias instead of
    /// being collected a second time.
    fn process_response(
        &self,
        queued: &QueuedUrl,
        response: FetchResponse,
        frontier: &mut Frontier,
    ) -> std::result::Result<Page, CrawlFailure> {
        let requested = queued.url.to_string();

        if !response.is_success() {
            tracing::debug!("{} returned HTTP {}", requested, response.status_code);
            return Err(CrawlFailure {
                url: requested,
                reason: FailureReason::HttpStatus {
                    status_code: response.status_code,
                },
            });
        }

        let origin = frontier.seed().clone();
        if !same_origin(&origin, &response.final_url) {
            tracing::debug!("{} redirected off-origin to {}", requested, response.final_url);
            return Err(CrawlFailure {
                url: requested,
                reason: FailureReason::OffOrigin {
                    final_url: response.final_url.to_string(),
                },
            });
        }

        let identity = canonicalize(&response.final_url).unwrap_or_else(|_| queued.url.clone());
        if identity != queued.url && !frontier.mark_seen(&identity) {
            tracing::debug!("{} redirected to already known page {}", requested, identity);
            return Err(CrawlFailure {
                url: requested,
                reason: FailureReason::Alias {
                    final_url: identity.to_string(),
                },
            });
        }
        let url = identity.to_string();

        let (title, links) = if response.is_html() {
            let parsed = parse_html(&response.body, &response.final_url);
            let mut links: Vec<String> = Vec::new();

            for link in &parsed.links {
                frontier.offer(link, queued.depth + 1);

                if let Ok(identity) = canonicalize(link) {
                    let identity = identity.to_string();
                    if same_origin(&origin, link) && identity != url && !links.contains(&identity) {
                        links.push(identity);
                    }
                }
            }

            (parsed.title, links)
        } else {
            (None, Vec::new())
        };

        Ok(Page {
            final_url: response.final_url.to_string(),
            status_code: response.status_code,
            content_type: response.content_type().map(str::to_string),
            title,
            links,
            depth: queued.depth,
            fetched_at: Utc::now(),
            body: response.body,
            url,
        })
    }
}

fn fetch_failure(queued: &QueuedUrl, error: FetchError) -> CrawlFailure {
    CrawlFailure {
        url: queued.url.to_string(),
        reason: FailureReason::Fetch {
            error_kind: error.kind,
            reason: error.reason,
        },
    }
}
