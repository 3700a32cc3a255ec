use crate::crawler::{FetchError, FetchErrorKind};
use serde::Serialize;
use std::fmt;

/// What happened when a single link was checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The server answered; the final status after redirects
    Status { status_code: u16 },
    /// No response was received
    Error {
        error_kind: FetchErrorKind,
        reason: String,
    },
    /// The input could not be parsed as an absolute HTTP(S) URL
    InvalidUrl { reason: String },
}

impl Outcome {
    /// A link is valid iff it answered with a status below 400
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Status { status_code } if *status_code < 400)
    }

    /// The numeric status, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<FetchError> for Outcome {
    fn from(error: FetchError) -> Self {
        Self::Error {
            error_kind: error.kind,
            reason: error.reason,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status_code } => write!(f, "HTTP {}", status_code),
            Self::Error { error_kind, reason } => write!(f, "{}: {}", error_kind, reason),
            Self::InvalidUrl { reason } => write!(f, "invalid URL: {}", reason),
        }
    }
}

/// Validation result for one input URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub url: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }

    pub fn is_broken(&self) -> bool {
        !self.outcome.is_valid()
    }
}

/// Results of one validation batch
///
/// Holds exactly one result per input URL, in completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// Number of results (equals the number of input URLs)
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results with a status below 400
    pub fn valid(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_valid())
    }

    /// Results with a status of 400 or above, a fetch error, or a bad URL
    pub fn broken(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| r.is_broken())
    }

    pub fn valid_count(&self) -> usize {
        self.valid().count()
    }

    pub fn broken_count(&self) -> usize {
        self.broken().count()
    }

    /// Splits the results into `(valid, broken)`
    pub fn partition(&self) -> (Vec<&ValidationResult>, Vec<&ValidationResult>) {
        self.results.iter().partition(|r| r.is_valid())
    }

    /// Looks up the result for a URL
    pub fn get(&self, url: &str) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.url == url)
    }
}
