//! Error types for the checker.
//!
//! Every lookup failure collapses into a single message string at the CLI
//! boundary, so the variants here mostly exist to build that message.

use std::error::Error as StdError;

use thiserror::Error;

/// Main error type for the checker library.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// One step of the fetch sequence failed.
    #[error("Error fetching {url}. Message: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchFailure,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {}", error_chain(.0))]
    Client(#[source] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command-line arguments were rejected.
    #[error("{0}")]
    Usage(String),
}

/// Reason a single fetch step failed.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Connection, TLS, timeout or body read failure.
    #[error("{}", error_chain(.0))]
    Transport(#[source] reqwest::Error),

    /// The server answered with a 4xx or 5xx status.
    #[error("The requested URL returned error: {0}")]
    Status(reqwest::StatusCode),

    /// The form page carried no `form_build_id` input.
    #[error("token not found")]
    TokenNotFound,

    /// The form submission response had no `Location` header.
    #[error("no redirect location")]
    NoRedirectLocation,

    /// The `Location` header could not be turned into a URL.
    #[error("invalid redirect location '{0}'")]
    InvalidLocation(String),
}

impl CheckerError {
    /// Tag a step failure with the URL being fetched.
    pub fn fetch(url: impl Into<String>, source: impl Into<FetchFailure>) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if err.is_status() => Self::Status(status),
            _ => Self::Transport(err),
        }
    }
}

/// Render an error followed by its causes, separated by `": "`.
///
/// `reqwest` keeps the interesting part (connection refused, DNS failure)
/// in the source chain rather than in its own message.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;
