//! Request/response surface a renderer drives.
//!
//! A search is one awaited call that yields the full ordered list plus its
//! status line. The cache is consulted first; on a miss the aggregator runs
//! under the search retry policy. Timeouts and errors always come back with
//! an empty list so a renderer never shows a mix of old and partial data.

use listenup_client::{AggregateError, Aggregator};
use listenup_core::{AggregatedRecord, AppConfig, CacheDb, Error, RetryError, RetryPolicy};
use serde::Serialize;
use std::time::Duration;

use crate::status::SearchStatus;

/// Result list and status line for one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub records: Vec<AggregatedRecord>,
    pub status: SearchStatus,
    /// Whether the list came from the local cache.
    pub cached: bool,
}

impl SearchOutcome {
    fn empty(status: SearchStatus) -> Self {
        Self { records: Vec::new(), status, cached: false }
    }

    fn found(records: Vec<AggregatedRecord>, cached: bool) -> Self {
        let status = SearchStatus::for_count(records.len());
        Self { records, status, cached }
    }
}

/// Search, favorites and cache maintenance over one store.
#[derive(Clone)]
pub struct SearchService {
    aggregator: Aggregator,
    cache: CacheDb,
    policy: RetryPolicy,
    cache_max_age: Duration,
}

impl SearchService {
    pub fn new(aggregator: Aggregator, cache: CacheDb, policy: RetryPolicy, cache_max_age: Duration) -> Self {
        Self { aggregator, cache, policy, cache_max_age }
    }

    pub fn from_config(aggregator: Aggregator, cache: CacheDb, config: &AppConfig) -> Self {
        Self::new(aggregator, cache, config.search_policy(), config.cache_max_age())
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    /// Cached results if fresh, otherwise a live aggregated search.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.run(query, true).await
    }

    /// Live search that ignores any cached entry, then refreshes it.
    pub async fn refresh(&self, query: &str) -> SearchOutcome {
        self.run(query, false).await
    }

    /// `query` is the cache key exactly as typed; only the catalogs see it trimmed.
    async fn run(&self, query: &str, use_cache: bool) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::empty(SearchStatus::NoResults);
        }

        if use_cache {
            match self.cache.lookup(query, self.cache_max_age).await {
                Ok(Some(records)) => {
                    tracing::debug!(query, results = records.len(), "cache hit");
                    return SearchOutcome::found(records, true);
                }
                Ok(None) => tracing::debug!(query, "cache miss"),
                Err(e) => tracing::warn!(query, "cache read failed, searching live: {}", e),
            }
        }

        let result = self.policy.run(|| self.aggregator.aggregate(query)).await;

        match result {
            Ok(records) => {
                if let Err(e) = self.cache.store(query, &records).await {
                    tracing::warn!(query, "cache write failed: {}", e);
                }
                SearchOutcome::found(records, false)
            }
            Err(RetryError::TimedOut(after)) => {
                tracing::warn!(query, ?after, "search timed out");
                SearchOutcome::empty(SearchStatus::TimedOut)
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::warn!(query, attempts, "search failed: {}", last);
                SearchOutcome::empty(SearchStatus::Error(error_message(&last)))
            }
        }
    }

    /// Add the record to favorites, or remove it if already there.
    /// Returns whether it is a favorite afterwards.
    pub async fn toggle_favorite(&self, record: &AggregatedRecord) -> Result<bool, Error> {
        let now_favorite = self.cache.toggle_favorite(record).await?;
        tracing::info!(key = %record.key(), favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    pub async fn list_favorites(&self) -> Result<Vec<AggregatedRecord>, Error> {
        self.cache.list_favorites().await
    }
}

fn error_message(err: &AggregateError) -> String {
    match err {
        AggregateError::AllSourcesFailed(_) => "all sources failed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listenup_client::{SourceClient, SourceError, SourceRecord};
    use listenup_core::{SourceKind, TextUrls};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that fails its first `failures` calls, then answers.
    struct ScriptedSource {
        kind: SourceKind,
        failures: usize,
        delay: Duration,
        records: Vec<SourceRecord>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn answering(kind: SourceKind, records: Vec<SourceRecord>) -> Arc<Self> {
            Self::flaky(kind, 0, records)
        }

        fn flaky(kind: SourceKind, failures: usize, records: Vec<SourceRecord>) -> Arc<Self> {
            Arc::new(Self { kind, failures, delay: Duration::ZERO, records, calls: AtomicUsize::new(0) })
        }

        fn hanging(kind: SourceKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                failures: 0,
                delay: Duration::from_secs(3600),
                records: vec![],
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SourceClient for ScriptedSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SourceRecord>, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if call < self.failures {
                return Err(SourceError::HttpError { status: 503 });
            }
            Ok(self.records.clone())
        }
    }

    fn book(title: &str, author: &str) -> SourceRecord {
        SourceRecord {
            title: Some(title.into()),
            author: Some(author.into()),
            text: TextUrls { epub: Some(format!("https://books.example/{title}.epub")), ..Default::default() },
            ..SourceRecord::new(SourceKind::Text)
        }
    }

    async fn service(source: Arc<ScriptedSource>) -> SearchService {
        let aggregator = Aggregator::new(vec![source as Arc<dyn SourceClient>]);
        let cache = CacheDb::open_in_memory().await.unwrap();
        SearchService::new(aggregator, cache, RetryPolicy::search(), Duration::from_secs(86_400))
    }

    #[tokio::test]
    async fn test_empty_query_is_no_results_without_io() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;

        let outcome = svc.search("  ").await;
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.status, SearchStatus::NoResults);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_then_cache_hit() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;

        let first = svc.search("emma").await;
        assert_eq!(first.status.to_string(), "Found 1 items");
        assert!(!first.cached);

        let second = svc.search("emma").await;
        assert!(second.cached);
        assert_eq!(second.records, first.records);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_skips_cache_read() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;

        svc.search("emma").await;
        let refreshed = svc.refresh("emma").await;
        assert!(!refreshed.cached);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_results_are_cached() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![]);
        let svc = service(source.clone()).await;

        let first = svc.search("nothing").await;
        assert_eq!(first.status, SearchStatus::NoResults);
        assert!(!first.cached);

        let second = svc.search("nothing").await;
        assert_eq!(second.status, SearchStatus::NoResults);
        assert!(second.cached);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_key_is_raw_query() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;

        svc.search("Emma").await;
        let padded = svc.search(" Emma").await;
        assert!(!padded.cached);
        assert_eq!(source.calls(), 2);

        let max_age = Duration::from_secs(60);
        assert!(svc.cache().lookup("Emma", max_age).await.unwrap().is_some());
        assert!(svc.cache().lookup(" Emma", max_age).await.unwrap().is_some());
        assert!(svc.cache().lookup("emma", max_age).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_failures() {
        let source = ScriptedSource::flaky(SourceKind::Text, 2, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;

        let outcome = svc.search("emma").await;
        assert_eq!(outcome.status, SearchStatus::Found(1));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_report_error_not_timeout() {
        let source = ScriptedSource::flaky(SourceKind::Text, usize::MAX, vec![]);
        let svc = service(source.clone()).await;

        let outcome = svc.search("emma").await;
        assert_eq!(outcome.status.to_string(), "Error: all sources failed");
        assert!(outcome.records.is_empty());
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_timed_out_and_caches_nothing() {
        let source = ScriptedSource::hanging(SourceKind::Text);
        let aggregator = Aggregator::new(vec![source as Arc<dyn SourceClient>]).with_source_timeout(Duration::from_secs(3600));
        let cache = CacheDb::open_in_memory().await.unwrap();
        let svc = SearchService::new(aggregator, cache, RetryPolicy::search(), Duration::from_secs(60));

        let outcome = svc.search("emma").await;
        assert_eq!(outcome.status.to_string(), "Search timed out");
        assert!(outcome.records.is_empty());
        assert_eq!(svc.cache().clear_search_cache().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_search() {
        let source = ScriptedSource::answering(SourceKind::Text, vec![book("Emma", "Jane Austen")]);
        let svc = service(source.clone()).await;
        svc.cache().clone().close().await.unwrap();

        let outcome = svc.search("emma").await;
        assert_eq!(outcome.status, SearchStatus::Found(1));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_toggle_and_list_favorites() {
        let svc = service(ScriptedSource::answering(SourceKind::Text, vec![])).await;
        let emma = AggregatedRecord::new("Emma", "Jane Austen");
        let walden = AggregatedRecord::new("Walden", "Henry David Thoreau");

        assert!(svc.toggle_favorite(&emma).await.unwrap());
        assert!(svc.toggle_favorite(&walden).await.unwrap());
        let titles: Vec<_> = svc.list_favorites().await.unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Walden", "Emma"]);

        assert!(!svc.toggle_favorite(&emma).await.unwrap());
        assert_eq!(svc.list_favorites().await.unwrap().len(), 1);
    }
}
