//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the core, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests with bounded body reads
//! - Choosing between automatic and manual redirect handling
//! - Normalizing every transport failure into a single `FetchError`

use crate::config::FetcherConfig;
use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client, Response};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// How redirects are treated for a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Follow redirects automatically; only the final response is returned
    Follow,
    /// Return 3xx responses as-is so the caller can walk the chain itself
    Manual,
}

/// Normalized response of a single GET request
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL that was requested
    pub url: Url,
    /// URL of the final response after any automatic redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body; empty for redirect responses fetched in manual mode
    pub body: String,
}

impl FetchResponse {
    fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Content-Type header value
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Location header value
    pub fn location(&self) -> Option<&str> {
        self.header(LOCATION)
    }

    /// True for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// True when the body is worth parsing for links
    ///
    /// Responses without a Content-Type are treated as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(true)
    }
}

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request did not complete before its deadline
    Timeout,
    /// Host name could not be resolved
    Dns,
    /// TLS handshake or certificate failure
    Tls,
    /// Connection refused, reset or otherwise not established
    Connect,
    /// Too many redirects while following automatically
    Redirect,
    /// Response body exceeded the configured size limit
    BodyTooLarge,
    /// Response body could not be read or decoded
    Body,
    /// Any other request failure
    Request,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Dns => "dns",
            Self::Tls => "tls",
            Self::Connect => "connect",
            Self::Redirect => "redirect",
            Self::BodyTooLarge => "body_too_large",
            Self::Body => "body",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fetch that produced no HTTP response
///
/// Network, DNS, timeout and TLS failures all end up here. It is a per-item
/// value: batch operations record it and carry on.
#[derive(Debug, Clone, Error, Serialize)]
#[error("Fetch failed for {url} ({kind}): {reason}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: &Url, kind: FetchErrorKind, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind,
            reason: reason.into(),
        }
    }

    /// Classifies a reqwest error
    pub fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let error = error.without_url();
        let reason = error_chain(&error);
        let lowered = reason.to_ascii_lowercase();

        let kind = if error.is_timeout() {
            FetchErrorKind::Timeout
        } else if error.is_redirect() {
            FetchErrorKind::Redirect
        } else if lowered.contains("dns") || lowered.contains("resolve") {
            FetchErrorKind::Dns
        } else if lowered.contains("certificate")
            || lowered.contains("tls")
            || lowered.contains("ssl")
        {
            FetchErrorKind::Tls
        } else if error.is_connect() {
            FetchErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            FetchErrorKind::Body
        } else {
            FetchErrorKind::Request
        };

        Self::new(url, kind, reason)
    }
}

/// Flattens an error and its sources into one line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// Builds an HTTP client with the given redirect policy
///
/// # Arguments
///
/// * `config` - The fetcher configuration
/// * `policy` - Redirect policy for every request made by this client
///
/// # Example
///
/// ```no_run
/// use linkscope::config::FetcherConfig;
/// use linkscope::crawler::build_http_client;
/// use reqwest::redirect::Policy;
///
/// let client = build_http_client(&FetcherConfig::default(), Policy::none()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig, policy: Policy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs GET requests on behalf of every operation
///
/// Holds one client that follows redirects and one that never does. Cloning
/// is cheap; clones share connection pools.
#[derive(Debug, Clone)]
pub struct Fetcher {
    following: Client,
    manual: Client,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            following: build_http_client(config, Policy::limited(config.max_auto_redirects))?,
            manual: build_http_client(config, Policy::none())?,
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn client(&self, mode: RedirectMode) -> &Client {
        match mode {
            RedirectMode::Follow => &self.following,
            RedirectMode::Manual => &self.manual,
        }
    }

    async fn send(&self, url: &Url, mode: RedirectMode) -> Result<Response, FetchError> {
        tracing::trace!("GET {} ({:?})", url, mode);

        self.client(mode)
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Fetches a URL and reads its body
    ///
    /// Any HTTP status is a successful fetch; only transport failures are
    /// errors. In manual mode the body of a 3xx response is not read.
    pub async fn fetch(&self, url: &Url, mode: RedirectMode) -> Result<FetchResponse, FetchError> {
        let response = self.send(url, mode).await?;
        let status_code = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = if mode == RedirectMode::Manual && response.status().is_redirection() {
            String::new()
        } else {
            read_body(response, url, self.max_body_bytes).await?
        };

        Ok(FetchResponse {
            url: url.clone(),
            final_url,
            status_code,
            headers,
            body,
        })
    }

    /// Fetches a URL without reading its body
    ///
    /// The returned response has an empty body. Used where only the status
    /// line and headers matter.
    pub async fn fetch_headers(
        &self,
        url: &Url,
        mode: RedirectMode,
    ) -> Result<FetchResponse, FetchError> {
        let response = self.send(url, mode).await?;

        Ok(FetchResponse {
            url: url.clone(),
            final_url: response.url().clone(),
            status_code: response.status().as_u16(),
            headers: response.headers().clone(),
            body: String::new(),
        })
    }

    /// Fetches a URL, following redirects, and returns only the final status
    pub async fn probe(&self, url: &Url) -> Result<u16, FetchError> {
        let response = self.fetch_headers(url, RedirectMode::Follow).await?;
        Ok(response.status_code)
    }
}

/// Reads a response body, refusing anything larger than `limit` bytes
async fn read_body(mut response: Response, url: &Url, limit: usize) -> Result<String, FetchError> {
    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            return Err(FetchError::new(
                url,
                FetchErrorKind::BodyTooLarge,
                format!("Content-Length {} exceeds limit of {} bytes", length, limit),
            ));
        }
    }

    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?
    {
        if buffer.len() + chunk.len() > limit {
            return Err(FetchError::new(
                url,
                FetchErrorKind::BodyTooLarge,
                format!("Body exceeds limit of {} bytes", limit),
            ));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
