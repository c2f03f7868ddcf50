//! Catalog client error types.

use std::sync::Arc;

/// Errors from a single catalog source.
///
/// Cheap to clone so one failure can be logged and reported at the same time.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Client configuration is unusable (bad base URL or header).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid lookup argument.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The source is disabled because its configuration is incomplete.
    #[error("source disabled")]
    Disabled,

    /// Requested resource does not exist.
    #[error("not found")]
    NotFound,

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed")]
    AuthError,

    /// Rate limited by the catalog.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SourceError::Timeout } else { SourceError::Network(Arc::new(err)) }
    }
}
