//! Audiobook catalog client (LibriVox feed API).
//!
//! - **Endpoint**: `{base_url}/audiobooks/?format=json&title=..&extended=1&limit=..`
//! - **Authentication**: none.
//! - The feed answers 404 when nothing matches; that is an empty result.

pub mod response;

pub use response::{LibriVoxBook, LibriVoxCoverArt, LibriVoxPerson, LibriVoxResponse, LibriVoxSection};

use listenup_core::{AppConfig, SourceKind};
use serde::Serialize;
use std::time::Duration;

use crate::http::{CatalogHttp, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, parse_base_url};
use crate::source::{SourceClient, SourceRecord};
use crate::SourceError;

/// Default base URL for the LibriVox feed.
pub const DEFAULT_BASE_URL: &str = "https://librivox.org/api/feed";

/// LibriVox client configuration.
#[derive(Debug, Clone)]
pub struct LibriVoxConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for LibriVoxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LibriVoxConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            base_url: config.librivox_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    format: &'static str,
    title: &'a str,
    extended: u8,
    limit: usize,
}

/// LibriVox audiobook client.
#[derive(Debug, Clone)]
pub struct LibriVoxClient {
    http: CatalogHttp,
    base_url: String,
}

impl LibriVoxClient {
    pub fn new(config: LibriVoxConfig) -> Result<Self, SourceError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = CatalogHttp::new(SourceKind::Audio, &config.user_agent, config.timeout, &[])?;
        Ok(Self { http, base_url })
    }
}

#[async_trait::async_trait]
impl SourceClient for LibriVoxClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Audio
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRecord>, SourceError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/audiobooks/", self.base_url);
        let params = SearchParams { format: "json", title: query, extended: 1, limit };
        let response: LibriVoxResponse = match self.http.get_json(&url, &params).await {
            Ok(response) => response,
            Err(SourceError::NotFound) => {
                tracing::debug!("audio catalog has no match");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(hits = response.books.len(), "audio catalog search completed");
        Ok(response.books.into_iter().map(SourceRecord::from).collect())
    }
}
