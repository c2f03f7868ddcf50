//! Unified error types for the listenup core.

use tokio_rusqlite::rusqlite;

/// Unified error types for cache, favorites and record handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a record without a title).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored JSON could not be encoded or decoded.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("missing title".to_string());
        assert!(err.to_string().contains("INVALID_INPUT"));
        assert!(err.to_string().contains("missing title"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<Vec<String>>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().starts_with("CACHE_ERROR"));
    }

    #[test]
    fn test_rusqlite_error_conversion() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
