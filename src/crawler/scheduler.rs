//! Crawl frontier management
//!
//! This module handles:
//! - The FIFO worklist of URLs still to fetch
//! - Deduplication by page identity (each URL is admitted once)
//! - The same-origin boundary
//! - The page budget and the attempt ceiling

use crate::url::{canonicalize, extract_host, same_origin};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The normalized URL to fetch
    pub url: Url,

    /// Host key used for request spacing
    pub host: String,

    /// Link distance from the seed
    pub depth: u32,
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlTermination {
    /// Every reachable same-origin page was attempted
    FrontierExhausted,
    /// The requested number of pages was collected
    PageBudgetReached,
    /// The fetch attempt ceiling was hit before the budget was filled
    AttemptCeilingReached,
}

/// Outcome of asking the frontier for more work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierStep {
    /// Fetch this URL next
    Fetch(QueuedUrl),
    /// Stop crawling
    Done(CrawlTermination),
}

/// Frontier and visited set for one crawl
///
/// A URL is marked as seen when it is admitted to the queue, which is always
/// before it is fetched, so a page can never be queued or fetched twice.
#[derive(Debug)]
pub struct Frontier {
    seed: Url,
    queue: VecDeque<QueuedUrl>,
    seen: HashSet<String>,
    max_pages: usize,
    max_attempts: usize,
    attempts: usize,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - Normalized seed URL; defines the crawl origin
    /// * `max_pages` - Page budget
    /// * `max_attempts` - Ceiling on fetch attempts, successful or not
    pub fn new(seed: Url, max_pages: usize, max_attempts: usize) -> Self {
        let mut frontier = Self {
            seed: seed.clone(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            max_pages,
            max_attempts,
            attempts: 0,
        };
        frontier.offer(&seed, 0);
        frontier
    }

    /// Offers a discovered link to the frontier
    ///
    /// The link is normalized; it is admitted only if it shares the seed's
    /// origin and has not been seen before.
    ///
    /// # Returns
    ///
    /// `true` if the link was queued
    pub fn offer(&mut self, link: &Url, depth: u32) -> bool {
        let Ok(url) = canonicalize(link) else {
            return false;
        };

        if !same_origin(&self.seed, &url) {
            tracing::trace!("Discarding off-origin link {}", url);
            return false;
        }

        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }

        let Some(host) = extract_host(&url) else {
            return false;
        };

        self.queue.push_back(QueuedUrl { url, host, depth });
        true
    }

    /// Marks a URL as seen without queueing it
    ///
    /// Used for the final URL of a followed redirect so the target is not
    /// fetched a second time under its own address.
    ///
    /// # Returns
    ///
    /// `true` if the URL had not been seen before
    pub fn mark_seen(&mut self, url: &Url) -> bool {
        match canonicalize(url) {
            Ok(url) => self.seen.insert(url.as_str().to_string()),
            Err(_) => false,
        }
    }

    /// Moves the crawl origin to where the seed actually lives
    ///
    /// Called when the seed redirects to another origin (`http` to `https`,
    /// apex to `www`). Links are filtered against the new origin from then
    /// on. Returns `false` if `url` cannot be normalized.
    pub fn rebase(&mut self, url: &Url) -> bool {
        match canonicalize(url) {
            Ok(url) => {
                self.seed = url;
                true
            }
            Err(_) => false,
        }
    }

    /// Returns the next URL to fetch, or the reason to stop
    ///
    /// The page budget is checked before anything else, so a crawl stops as
    /// soon as `pages_collected` reaches it even with work left in the queue.
    pub fn next(&mut self, pages_collected: usize) -> FrontierStep {
        if pages_collected >= self.max_pages {
            return FrontierStep::Done(CrawlTermination::PageBudgetReached);
        }

        if self.attempts >= self.max_attempts {
            return FrontierStep::Done(CrawlTermination::AttemptCeilingReached);
        }

        match self.queue.pop_front() {
            Some(queued) => {
                self.attempts += 1;
                FrontierStep::Fetch(queued)
            }
            None => FrontierStep::Done(CrawlTermination::FrontierExhausted),
        }
    }

    /// Number of fetch attempts handed out so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Returns the number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs admitted so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// The crawl seed
    pub fn seed(&self) -> &Url {
        &self.seed
    }
}
