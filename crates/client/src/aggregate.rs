//! Cross-catalog fan-out, merge and ranking.
//!
//! One query goes to every enabled source at once. Each source's complete
//! result set is buffered, then the sets are merged in priority order
//! (the order the sources were supplied in), regardless of which response
//! arrived first. Records sharing a normalized `title|author` key collapse
//! into one; every field is set-if-empty, so the highest-priority source
//! that has a value keeps it.

use listenup_core::record::{UNTITLED, rank};
use listenup_core::{AggregatedRecord, AppConfig, normalized_key};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::gutenberg::{GutenbergClient, GutenbergConfig};
use crate::librivox::{LibriVoxClient, LibriVoxConfig};
use crate::openlibrary::{OpenLibraryClient, OpenLibraryConfig};
use crate::source::{SourceClient, SourceRecord};
use crate::{SourceError, http::DEFAULT_TIMEOUT};

/// Default number of hits requested from each source.
pub const DEFAULT_LIMIT: usize = 12;

/// Aggregation failures. Individual source failures are not errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AggregateError {
    /// Every enabled source failed for this query.
    #[error("all sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
}

/// Accumulates one merged record.
#[derive(Debug)]
struct RecordBuilder {
    record: AggregatedRecord,
}

impl RecordBuilder {
    fn new() -> Self {
        Self { record: AggregatedRecord::new("", "") }
    }

    fn apply(&mut self, title: &str, author: &str, hit: &SourceRecord) {
        let r = &mut self.record;
        if r.title.is_empty() {
            r.title = title.to_string();
        }
        if r.author.is_empty() {
            r.author = author.to_string();
        }
        r.text.fill_from(&hit.text);
        fill(&mut r.audio_url, &hit.audio_url);
        fill(&mut r.cover_url, &hit.cover_url);
        fill(&mut r.language, &hit.language);
        if r.first_publish_year.is_none() {
            r.first_publish_year = hit.first_publish_year;
        }
        if !r.sources.contains(&hit.source) {
            r.sources.push(hit.source);
        }
    }

    fn finish(mut self) -> AggregatedRecord {
        if self.record.title.trim().is_empty() {
            self.record.title = UNTITLED.to_string();
        }
        self.record
    }
}

fn fill(slot: &mut Option<String>, candidate: &Option<String>) {
    if slot.as_deref().is_none_or(|s| s.trim().is_empty())
        && let Some(value) = candidate.as_deref().filter(|s| !s.trim().is_empty())
    {
        *slot = Some(value.to_string());
    }
}

/// Merge result sets given in priority order and rank the outcome.
pub fn merge<I>(result_sets: I) -> Vec<AggregatedRecord>
where
    I: IntoIterator<Item = Vec<SourceRecord>>,
{
    // Builders stay in first-seen order so ranking ties resolve by source priority.
    let mut builders: Vec<RecordBuilder> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for hit in result_sets.into_iter().flatten() {
        let title = hit.title.as_deref().map(str::trim).filter(|t| !t.is_empty()).unwrap_or(UNTITLED);
        let author = hit.author.as_deref().map(str::trim).unwrap_or_default();
        let slot = *index.entry(normalized_key(title, author)).or_insert_with(|| {
            builders.push(RecordBuilder::new());
            builders.len() - 1
        });
        builders[slot].apply(title, author, &hit);
    }

    let mut records: Vec<AggregatedRecord> = builders.into_iter().map(RecordBuilder::finish).collect();
    rank(&mut records);
    records
}

/// Fans a query out to every source and merges the answers.
#[derive(Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn SourceClient>>,
    limit: usize,
    source_timeout: Duration,
}

impl Aggregator {
    /// Sources are merged in the order given: earlier sources win field conflicts.
    pub fn new(sources: Vec<Arc<dyn SourceClient>>) -> Self {
        Self { sources, limit: DEFAULT_LIMIT, source_timeout: DEFAULT_TIMEOUT }
    }

    /// Text, audio and bibliographic catalogs, in that priority, from app config.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let sources: Vec<Arc<dyn SourceClient>> = vec![
            Arc::new(GutenbergClient::new(GutenbergConfig::from_app(config))?),
            Arc::new(LibriVoxClient::new(LibriVoxConfig::from_app(config))?),
            Arc::new(OpenLibraryClient::new(OpenLibraryConfig::from_app(config))?),
        ];
        Ok(Self::new(sources).with_limit(config.page_size).with_source_timeout(config.timeout()))
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Bound on each individual source call; a late source counts as failed.
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn sources(&self) -> &[Arc<dyn SourceClient>] {
        &self.sources
    }

    /// Search every enabled source concurrently and merge the results.
    ///
    /// A failing source contributes nothing; only when every enabled source
    /// fails is the whole call an error. Dropping the returned future aborts
    /// all pending source calls.
    pub async fn aggregate(&self, query: &str) -> Result<Vec<AggregatedRecord>, AggregateError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut join_set = JoinSet::new();
        let mut enabled = 0usize;

        for (idx, source) in self.sources.iter().enumerate() {
            if !source.is_enabled() {
                tracing::debug!(source = %source.kind(), "source disabled, skipping");
                continue;
            }
            enabled += 1;

            let source = Arc::clone(source);
            let query = query.to_string();
            let limit = self.limit;
            let timeout = self.source_timeout;

            join_set.spawn(async move {
                let result = match tokio::time::timeout(timeout, source.search(&query, limit)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout),
                };
                (idx, result)
            });
        }

        let mut buffered: Vec<Option<Vec<SourceRecord>>> = (0..self.sources.len()).map(|_| None).collect();
        let mut failures = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, Ok(records))) => {
                    tracing::debug!(source = %self.sources[idx].kind(), hits = records.len(), "source answered");
                    buffered[idx] = Some(records);
                }
                Ok((idx, Err(e))) => {
                    let kind = self.sources[idx].kind();
                    tracing::warn!(source = %kind, "source failed: {}", e);
                    failures.push(format!("{kind}: {e}"));
                }
                Err(e) => {
                    tracing::warn!("source task failed: {}", e);
                    failures.push(e.to_string());
                }
            }
        }

        if enabled > 0 && failures.len() == enabled {
            return Err(AggregateError::AllSourcesFailed(failures));
        }

        let records = merge(buffered.into_iter().flatten());
        tracing::info!(query, sources = enabled, failed = failures.len(), results = records.len(), "aggregated search");
        Ok(records)
    }
}
