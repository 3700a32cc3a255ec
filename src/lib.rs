//! Linkscope: site traversal and link-graph analysis
//!
//! This crate implements the link-analysis core of an SEO toolkit:
//! bounded same-origin crawling, concurrent link validation, redirect chain
//! resolution with loop detection, and internal link suggestions ranked by
//! graph centrality and clustering.

pub mod auditor;
pub mod config;
pub mod crawler;
pub mod graph;
pub mod redirects;
pub mod state;
pub mod url;
pub mod validator;

use thiserror::Error;

/// Main error type for Linkscope operations
///
/// These are request-level failures: the operation could not start or could
/// not produce a result at all. Per-link network failures never surface here,
/// they are reported inside the operation's result instead.
#[derive(Debug, Error)]
pub enum LinkscopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{url} returned HTTP {status_code}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("{0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Linkscope operations
pub type Result<T> = std::result::Result<T, LinkscopeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use auditor::Auditor;
pub use config::Config;
pub use crawler::{CrawlReport, FetchError, Fetcher};
pub use graph::{suggest_links, LinkGraph, SuggestionReport};
pub use redirects::{resolve_redirects, RedirectReport};
pub use url::{normalize_url, page_id_from_url, same_origin};
pub use validator::{validate_links, ValidationReport, ValidationResult};
