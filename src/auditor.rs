//! High-level entry points
//!
//! [`Auditor`] owns one configured [`Fetcher`] and exposes every link
//! analysis operation over plain strings and numbers. Each call is
//! independent; nothing is shared between calls except the HTTP connection
//! pools.

use crate::config::{validate, Config};
use crate::crawler::{CrawlReport, Coordinator, Fetcher, RedirectMode};
use crate::graph::{extract_internal_pages, suggest_links, PageSuggestions, SuggestionReport};
use crate::redirects::{resolve_redirects, RedirectReport};
use crate::url::{is_http, page_id_from_url, HOME_PAGE_ID};
use crate::validator::{check_page, validate_links, PageLinkReport, ValidationReport};
use crate::{LinkscopeError, Result, UrlError};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// Title reported for the site root
pub const HOME_PAGE_TITLE: &str = "Homepage";

/// Title reported for pages without a `<title>`
pub const UNTITLED_PAGE_TITLE: &str = "Untitled";

/// Suggestions for one crawled page, with its title attached
#[derive(Debug, Clone, Serialize)]
pub struct PageRecommendation {
    pub page: String,
    pub title: String,
    pub targets: Vec<String>,
}

/// Result of [`Auditor::optimize_site`]
#[derive(Debug, Clone, Serialize)]
pub struct SiteOptimization {
    /// Normalized seed URL
    pub seed: String,

    /// Pages collected by the crawl
    pub pages_crawled: usize,

    /// Slug-level link pairs the suggestions were computed from
    pub edges: Vec<(String, String)>,

    /// One entry per crawled page, in crawl identity order
    pub recommendations: Vec<PageRecommendation>,
}

/// Facade over crawling, validation, redirect resolution and suggestions
#[derive(Debug, Clone)]
pub struct Auditor {
    config: Config,
    fetcher: Fetcher,
}

impl Auditor {
    /// Validates `config` and builds the HTTP clients
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let fetcher = Fetcher::new(&config.fetcher)?;
        Ok(Self { config, fetcher })
    }

    /// The configuration this auditor was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls `seed`, collecting at most `max_pages` pages
    ///
    /// `None` uses the configured budget.
    pub async fn crawl(&self, seed: &str, max_pages: Option<usize>) -> Result<CrawlReport> {
        let max_pages = max_pages.unwrap_or(self.config.crawler.max_pages);
        Coordinator::new(self.fetcher.clone(), self.config.crawler.clone())
            .crawl(seed, max_pages)
            .await
    }

    /// Checks every URL concurrently; one result per input URL
    pub async fn validate_links(&self, urls: Vec<String>) -> ValidationReport {
        validate_links(&self.fetcher, urls, self.config.validator.max_concurrent).await
    }

    /// Fetches one page and validates every link found on it
    pub async fn check_page(&self, page_url: &str) -> Result<PageLinkReport> {
        check_page(&self.fetcher, page_url, self.config.validator.max_concurrent).await
    }

    /// Resolves the redirect chain of `start_url`
    ///
    /// `None` uses the configured hop budget.
    pub async fn resolve_redirects(
        &self,
        start_url: &str,
        max_hops: Option<usize>,
    ) -> Result<RedirectReport> {
        let max_hops = max_hops.unwrap_or(self.config.redirects.max_hops);
        resolve_redirects(&self.fetcher, start_url, max_hops).await
    }

    /// Ranks new internal link targets for every page
    ///
    /// `None` uses the configured `top_n`.
    pub fn suggest_links(
        &self,
        pages: &[String],
        edges: &[(String, String)],
        top_n: Option<usize>,
    ) -> SuggestionReport {
        suggest_links(pages, edges, top_n.unwrap_or(self.config.suggest.top_n))
    }

    /// Fetches `root_url` and returns the page ids it links to on its own site
    ///
    /// At most `max_links` ids are returned; `None` uses the configured cap.
    ///
    /// # Errors
    ///
    /// Fails if the page cannot be fetched or answers with a non-2xx status.
    pub async fn internal_pages(
        &self,
        root_url: &str,
        max_links: Option<usize>,
    ) -> Result<Vec<String>> {
        let root = Url::parse(root_url.trim())?;
        if !is_http(&root) {
            return Err(UrlError::InvalidScheme(root.scheme().to_string()).into());
        }

        let response = self.fetcher.fetch(&root, RedirectMode::Follow).await?;
        if !response.is_success() {
            return Err(LinkscopeError::HttpStatus {
                url: root.to_string(),
                status_code: response.status_code,
            });
        }

        let max_links = max_links.unwrap_or(self.config.suggest.max_links);
        Ok(extract_internal_pages(
            &response.final_url,
            &response.body,
            max_links,
        ))
    }

    /// Crawls a site and suggests internal links for every page found
    ///
    /// Pages are identified by slug (see [`page_id_from_url`]); the site
    /// root is titled "Homepage" and pages without a title "Untitled".
    pub async fn optimize_site(
        &self,
        seed: &str,
        max_pages: Option<usize>,
        top_n: Option<usize>,
    ) -> Result<SiteOptimization> {
        let report = self.crawl(seed, max_pages).await?;
        let pages = report.page_slugs();
        let edges = report.slug_edges();
        let titles = page_titles(&report);

        tracing::info!(
            "Suggesting links for {} pages ({} existing links)",
            pages.len(),
            edges.len()
        );

        let suggestions = self.suggest_links(&pages, &edges, top_n);
        let recommendations = suggestions
            .suggestions
            .into_iter()
            .map(|PageSuggestions { page, targets }| PageRecommendation {
                title: title_for(&page, &titles),
                page,
                targets,
            })
            .collect();

        Ok(SiteOptimization {
            seed: report.seed,
            pages_crawled: report.pages.len(),
            edges,
            recommendations,
        })
    }
}

/// First non-empty title seen for each slug
fn page_titles(report: &CrawlReport) -> HashMap<String, String> {
    let mut titles = HashMap::new();

    for page in report.pages.values() {
        let Ok(url) = Url::parse(&page.url) else {
            continue;
        };
        if let Some(title) = page.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            titles
                .entry(page_id_from_url(&url))
                .or_insert_with(|| title.to_string());
        }
    }

    titles
}

fn title_for(page: &str, titles: &HashMap<String, String>) -> String {
    if page == HOME_PAGE_ID {
        return HOME_PAGE_TITLE.to_string();
    }

    titles
        .get(page)
        .cloned()
        .unwrap_or_else(|| UNTITLED_PAGE_TITLE.to_string())
}
