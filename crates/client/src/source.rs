//! Common capability shared by every catalog client.

use listenup_core::{SourceKind, TextUrls};

use crate::SourceError;

/// One catalog hit, reduced to the fields the merge understands.
///
/// Each catalog fills only the fields it owns: text formats come from the
/// text catalog, audio from the audiobook catalog, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub source: SourceKind,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub text: TextUrls,
    pub audio_url: Option<String>,
    pub cover_url: Option<String>,
    pub first_publish_year: Option<i32>,
}

impl SourceRecord {
    /// An empty record attributed to `source`.
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            title: None,
            author: None,
            language: None,
            text: TextUrls::default(),
            audio_url: None,
            cover_url: None,
            first_publish_year: None,
        }
    }
}

/// A searchable catalog.
///
/// Implementations issue at most one request per `search` call and return
/// an empty list, without touching the network, for a blank query.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    /// Which catalog this client talks to.
    fn kind(&self) -> SourceKind;

    /// Disabled clients are skipped by the aggregator and never fail.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Search the catalog for `query`, asking for at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceRecord>, SourceError>;
}

/// Trimmed value, or None if missing or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
