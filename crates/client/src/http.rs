//! Shared HTTP plumbing for the catalog clients.
//!
//! Each catalog gets its own `reqwest::Client` with a per-request timeout,
//! a user agent and any static headers (API keys) baked in as defaults.
//! Every call is one GET whose JSON body is decoded into the catalog's
//! response schema.

use bytes::Bytes;
use listenup_core::SourceKind;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::SourceError;

/// Default timeout for a single catalog request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = "listenup/0.1";

/// Parse and normalize a configured base URL (no trailing slash).
pub(crate) fn parse_base_url(raw: &str) -> Result<String, SourceError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| SourceError::InvalidConfig(format!("base URL {trimmed:?}: {e}")))?;
    Ok(trimmed.to_string())
}

/// Map a response status to the error it represents, if any.
pub(crate) fn status_error(status: StatusCode) -> Option<SourceError> {
    match status.as_u16() {
        401 | 403 => Some(SourceError::AuthError),
        404 => Some(SourceError::NotFound),
        429 => Some(SourceError::RateLimited),
        _ if status.is_success() => None,
        code => Some(SourceError::HttpError { status: code }),
    }
}

/// JSON-over-HTTP client bound to one catalog.
#[derive(Debug, Clone)]
pub(crate) struct CatalogHttp {
    http: reqwest::Client,
    source: SourceKind,
}

impl CatalogHttp {
    pub(crate) fn new(
        source: SourceKind, user_agent: &str, timeout: Duration, headers: &[(String, String)],
    ) -> Result<Self, SourceError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SourceError::InvalidConfig(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SourceError::InvalidConfig(format!("header value for {name}: {e}")))?;
            default_headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .default_headers(default_headers)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| SourceError::Network(Arc::new(e)))?;

        Ok(Self { http, source })
    }

    /// Issue one GET with `query` parameters and decode the JSON body.
    pub(crate) async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let start = Instant::now();
        tracing::debug!(source = %self.source, url, "catalog request");

        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        tracing::debug!(source = %self.source, %status, "catalog response");
        if let Some(err) = status_error(status) {
            return Err(err);
        }

        let body: Bytes = response.bytes().await?;
        let parsed = serde_json::from_slice(&body).map_err(|e| SourceError::Parse(e.to_string()))?;

        tracing::debug!(source = %self.source, elapsed = ?start.elapsed(), bytes = body.len(), "catalog request completed");
        Ok(parsed)
    }
}
