//! Redirect chain resolution
//!
//! Follows one URL's redirects hop by hop with automatic redirect handling
//! turned off, so every intermediate status is observed. Stops on a
//! non-redirect response, a malformed redirect, a repeated URL, or when the
//! hop budget runs out.

use crate::crawler::{Fetcher, RedirectMode};
use crate::url::is_http;
use crate::{LinkscopeError, Result, UrlError};
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Status codes treated as redirects
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Returns true if `status_code` is one of [`REDIRECT_STATUSES`]
pub fn is_redirect_status(status_code: u16) -> bool {
    REDIRECT_STATUSES.contains(&status_code)
}

/// One observed response in a redirect chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectHop {
    /// URL that was requested
    pub url: String,

    /// Status it answered with
    pub status_code: u16,
}

/// Why a redirect resolution stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTermination {
    /// A non-redirect response was reached
    Resolved,
    /// A redirect pointed back at a URL already in the chain
    LoopDetected,
    /// A redirect status arrived without a `Location` header
    MissingLocation,
    /// The `Location` header could not be resolved to an HTTP(S) URL
    InvalidLocation,
    /// `max_hops` requests were made without reaching a terminal response
    HopBudgetExhausted,
}

/// Result of resolving one URL's redirects
#[derive(Debug, Clone, Serialize)]
pub struct RedirectReport {
    /// The URL resolution started from
    pub start_url: String,

    /// Every response observed, in request order
    pub chain: Vec<RedirectHop>,

    /// True only when a URL repeated within the chain
    pub loop_detected: bool,

    /// Where the chain ended up
    ///
    /// On a loop this is the repeated URL. On budget exhaustion it is the
    /// next URL that would have been requested.
    pub final_url: String,

    /// Why resolution stopped
    pub termination: RedirectTermination,

    /// Directed redirect edges `(from, to)`; a loop adds a self-edge on the
    /// repeated URL
    pub edges: Vec<(String, String)>,
}

impl RedirectReport {
    /// Number of hops in the chain
    pub fn hop_count(&self) -> usize {
        self.chain.len()
    }

    /// Returns true if the chain ended on a non-redirect response
    pub fn is_resolved(&self) -> bool {
        self.termination == RedirectTermination::Resolved
    }
}

/// Builds up a chain while it is being followed
struct ChainBuilder {
    start_url: String,
    chain: Vec<RedirectHop>,
    edges: Vec<(String, String)>,
    seen: HashSet<String>,
}

impl ChainBuilder {
    fn new(start: &Url) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start.to_string());

        Self {
            start_url: start.to_string(),
            chain: Vec::new(),
            edges: Vec::new(),
            seen,
        }
    }

    fn hop(&mut self, url: &Url, status_code: u16) {
        self.chain.push(RedirectHop {
            url: url.to_string(),
            status_code,
        });
    }

    /// Records the edge and returns false if `to` was already in the chain
    fn follow(&mut self, from: &Url, to: &Url) -> bool {
        self.edges.push((from.to_string(), to.to_string()));
        if self.seen.insert(to.to_string()) {
            return true;
        }

        self.edges.push((to.to_string(), to.to_string()));
        false
    }

    fn finish(self, final_url: &Url, termination: RedirectTermination) -> RedirectReport {
        RedirectReport {
            start_url: self.start_url,
            chain: self.chain,
            loop_detected: termination == RedirectTermination::LoopDetected,
            final_url: final_url.to_string(),
            termination,
            edges: self.edges,
        }
    }
}

/// Resolves the redirect chain starting at `start_url`
///
/// Each step issues one request without following redirects. A URL that
/// repeats anywhere in the chain, including the start, is reported as a
/// loop, even if the round trip would have settled on a later request.
///
/// # Errors
///
/// Returns an error for an unparsable or non-HTTP(S) start URL, a zero hop
/// budget, or any fetch failure along the way. A partial chain is never
/// returned as a success.
pub async fn resolve_redirects(
    fetcher: &Fetcher,
    start_url: &str,
    max_hops: usize,
) -> Result<RedirectReport> {
    if max_hops == 0 {
        return Err(LinkscopeError::InvalidParameter(
            "max_hops must be at least 1".to_string(),
        ));
    }

    let start = Url::parse(start_url.trim())?;
    if !is_http(&start) {
        return Err(UrlError::InvalidScheme(start.scheme().to_string()).into());
    }

    tracing::info!("Resolving redirects for {} (max {} hops)", start, max_hops);

    let mut builder = ChainBuilder::new(&start);
    let mut current = start;

    for _ in 0..max_hops {
        let response = fetcher.fetch_headers(&current, RedirectMode::Manual).await?;
        let status_code = response.status_code;
        builder.hop(&current, status_code);

        if !is_redirect_status(status_code) {
            tracing::debug!("{} resolved with HTTP {}", current, status_code);
            return Ok(builder.finish(&current, RedirectTermination::Resolved));
        }

        let Some(location) = response.location() else {
            tracing::warn!("{} sent HTTP {} without a Location header", current, status_code);
            return Ok(builder.finish(&current, RedirectTermination::MissingLocation));
        };

        let next = match current.join(location.trim()) {
            Ok(next) if is_http(&next) => next,
            _ => {
                tracing::warn!("{} redirected to unusable location {:?}", current, location);
                return Ok(builder.finish(&current, RedirectTermination::InvalidLocation));
            }
        };

        tracing::debug!("{} -> {} (HTTP {})", current, next, status_code);

        if !builder.follow(&current, &next) {
            tracing::warn!("Redirect loop detected at {}", next);
            return Ok(builder.finish(&next, RedirectTermination::LoopDetected));
        }

        current = next;
    }

    tracing::warn!(
        "Gave up after {} hops; chain continues at {}",
        max_hops,
        current
    );
    Ok(builder.finish(&current, RedirectTermination::HopBudgetExhausted))
}
