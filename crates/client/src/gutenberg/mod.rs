//! Text catalog client (Gutenberg books API).
//!
//! - **Endpoint**: `{base_url}/api/books?q=..&page_size=..&page=1`
//! - **Authentication**: API key header (and optional gateway host header).
//!   Without a base URL or key the client is disabled and every search
//!   returns an empty list without a request.

pub mod response;

pub use response::{GutenbergAuthor, GutenbergBook, GutenbergFormat, GutenbergPage};

use listenup_core::{AppConfig, SourceKind};
use serde::Serialize;
use std::time::Duration;

use crate::http::{CatalogHttp, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, parse_base_url};
use crate::source::{SourceClient, SourceRecord};
use crate::SourceError;

/// Gutenberg client configuration.
#[derive(Debug, Clone, Default)]
pub struct GutenbergConfig {
    /// API base URL; None or empty disables the client.
    pub base_url: Option<String>,
    /// API key header as (name, value); None disables the client.
    pub auth: Option<(String, String)>,
    /// Optional gateway host header as (name, value).
    pub host: Option<(String, String)>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl GutenbergConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        let settings = &config.gutenberg;
        let host = settings
            .host_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !settings.host_header.trim().is_empty())
            .map(|v| (settings.host_header.trim().to_string(), v.to_string()));

        Self {
            base_url: settings.base_url.clone(),
            auth: config.gutenberg_auth().map(|(k, v)| (k.to_string(), v.to_string())),
            host,
            timeout: Some(config.timeout()),
            user_agent: Some(config.user_agent.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    page_size: usize,
    page: u32,
}

#[derive(Debug, Clone)]
struct Enabled {
    http: CatalogHttp,
    base_url: String,
}

/// Gutenberg books API client.
#[derive(Debug, Clone)]
pub struct GutenbergClient {
    inner: Option<Enabled>,
}

impl GutenbergClient {
    /// Create a client. Incomplete configuration yields a disabled client.
    pub fn new(config: GutenbergConfig) -> Result<Self, SourceError> {
        let base_url = config.base_url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let (Some(base_url), Some(auth)) = (base_url, config.auth) else {
            tracing::info!("text catalog disabled: base URL or API key not configured");
            return Ok(Self { inner: None });
        };

        let base_url = parse_base_url(base_url)?;
        let headers: Vec<(String, String)> = std::iter::once(auth).chain(config.host).collect();
        let http = CatalogHttp::new(
            SourceKind::Text,
            config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            config.timeout.unwrap_or(DEFAULT_TIMEOUT),
            &headers,
        )?;

        Ok(Self { inner: Some(Enabled { http, base_url }) })
    }

    /// A client that never issues requests.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Fetch a single book by catalog id.
    pub async fn get_by_id(&self, id: u64) -> Result<GutenbergBook, SourceError> {
        let enabled = self.inner.as_ref().ok_or(SourceError::Disabled)?;
        let url = format!("{}/api/books/{}", enabled.base_url, id);
        enabled.http.get_json(&url, &()).await
    }
}

#[async_trait::async_trait]
impl SourceClient for GutenbergClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRecord>, SourceError> {
        let query = query.trim();
        let Some(enabled) = self.inner.as_ref() else {
            return Ok(Vec::new());
        };
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/books", enabled.base_url);
        let params = SearchParams { q: query, page_size: limit, page: 1 };
        let page: GutenbergPage<GutenbergBook> = enabled.http.get_json(&url, &params).await?;

        tracing::debug!(hits = page.results.len(), "text catalog search completed");
        Ok(page.results.into_iter().map(SourceRecord::from).collect())
    }
}
