//! Bibliographic catalog client (Open Library).
//!
//! - **Search**: `{base_url}/search.json?q=..&page=1&limit=..`
//! - **Edition lookup**: `{base_url}/books/{olid}.json`
//! - **Covers**: `{covers_base_url}/b/olid/{olid}-M.jpg`

pub mod response;

pub use response::{OpenLibraryDoc, OpenLibraryEdition, OpenLibraryRef, OpenLibrarySearch};

use listenup_core::{AppConfig, SourceKind};
use serde::Serialize;
use std::time::Duration;

use crate::http::{CatalogHttp, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, parse_base_url};
use crate::source::{SourceClient, SourceRecord};
use crate::SourceError;

/// Default base URL for Open Library.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Default base URL for the cover image service.
pub const DEFAULT_COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

/// Open Library client configuration.
#[derive(Debug, Clone)]
pub struct OpenLibraryConfig {
    pub base_url: String,
    pub covers_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            covers_base_url: DEFAULT_COVERS_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OpenLibraryConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            base_url: config.openlibrary_base_url.clone(),
            covers_base_url: config.covers_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    page: u32,
    limit: usize,
}

/// Open Library client.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    http: CatalogHttp,
    base_url: String,
    covers_base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: OpenLibraryConfig) -> Result<Self, SourceError> {
        let base_url = parse_base_url(&config.base_url)?;
        let covers_base_url = parse_base_url(&config.covers_base_url)?;
        let http = CatalogHttp::new(SourceKind::Bibliographic, &config.user_agent, config.timeout, &[])?;
        Ok(Self { http, base_url, covers_base_url })
    }

    /// Fetch one edition by its Open Library id (e.g. `OL7064458M`).
    pub async fn get_edition(&self, olid: &str) -> Result<OpenLibraryEdition, SourceError> {
        let olid = olid.trim();
        if olid.is_empty() || !olid.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SourceError::InvalidQuery(format!("invalid edition id: {olid:?}")));
        }
        let url = format!("{}/books/{}.json", self.base_url, olid);
        self.http.get_json(&url, &()).await
    }
}

#[async_trait::async_trait]
impl SourceClient for OpenLibraryClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Bibliographic
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRecord>, SourceError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/search.json", self.base_url);
        let params = SearchParams { q: query, page: 1, limit };
        let search: OpenLibrarySearch = self.http.get_json(&url, &params).await?;

        tracing::debug!(hits = search.docs.len(), total = search.num_found, "bibliographic search completed");
        Ok(search
            .docs
            .into_iter()
            .map(|doc| doc.into_source_record(&self.covers_base_url))
            .collect())
    }
}
