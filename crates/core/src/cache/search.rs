//! Search cache operations.
//!
//! Aggregated result lists are stored under the raw query string together
//! with the Unix time they were written. Entries older than the caller's
//! `max_age` read as a miss but stay in the table until overwritten or
//! purged.

use super::connection::CacheDb;
use crate::Error;
use crate::record::AggregatedRecord;
use chrono::Utc;
use std::time::Duration;
use tokio_rusqlite::params;

fn age_limit(max_age: Duration) -> i64 {
    i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)
}

impl CacheDb {
    /// Get cached results for `query` if they are at most `max_age` old.
    ///
    /// Returns None on a missing or stale entry.
    pub async fn lookup(&self, query: &str, max_age: Duration) -> Result<Option<Vec<AggregatedRecord>>, Error> {
        self.lookup_at(query, max_age, Utc::now().timestamp()).await
    }

    pub(crate) async fn lookup_at(
        &self, query: &str, max_age: Duration, now: i64,
    ) -> Result<Option<Vec<AggregatedRecord>>, Error> {
        let key = query.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, i64)>, Error> {
                let mut stmt = conn.prepare("SELECT results_json, stored_at FROM search_cache WHERE query = ?1")?;

                let result = stmt.query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)));

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((json, stored_at)) = row else {
            return Ok(None);
        };

        let age = now.saturating_sub(stored_at);
        if age > age_limit(max_age) {
            tracing::debug!(query, age, "cached search is stale");
            return Ok(None);
        }

        let records = serde_json::from_str(&json)?;
        Ok(Some(records))
    }

    /// Insert or replace the cached results for `query`.
    pub async fn store(&self, query: &str, records: &[AggregatedRecord]) -> Result<(), Error> {
        self.store_at(query, records, Utc::now().timestamp()).await
    }

    pub(crate) async fn store_at(&self, query: &str, records: &[AggregatedRecord], stored_at: i64) -> Result<(), Error> {
        let key = query.to_string();
        let results_json = serde_json::to_string(records)?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO search_cache (query, results_json, stored_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(query) DO UPDATE SET
                        results_json = excluded.results_json,
                        stored_at = excluded.stored_at",
                    params![key, results_json, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete cached searches older than `max_age`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_stale_searches(&self, max_age: Duration) -> Result<u64, Error> {
        let cutoff = Utc::now().timestamp().saturating_sub(age_limit(max_age));
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM search_cache WHERE stored_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every cached search. Favorites are kept.
    pub async fn clear_search_cache(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM search_cache", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    fn sample() -> Vec<AggregatedRecord> {
        let mut first = AggregatedRecord::new("Pride and Prejudice", "Jane Austen");
        first.text.epub = Some("https://example.org/pp.epub".into());
        let mut second = AggregatedRecord::new("Emma", "Jane Austen");
        second.audio_url = Some("https://example.org/emma.mp3".into());
        vec![first, second]
    }

    async fn row_count(db: &CacheDb) -> i64 {
        db.conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM search_cache", [], |row| row.get(0)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_and_lookup() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store("austen", &sample()).await.unwrap();

        let cached = db.lookup("austen", DAY).await.unwrap().unwrap();
        assert_eq!(cached, sample());
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.lookup("nothing", DAY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_twice_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store("austen", &sample()).await.unwrap();
        db.store("austen", &sample()).await.unwrap();

        assert_eq!(db.lookup("austen", DAY).await.unwrap().unwrap(), sample());
        assert_eq!(row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_miss_but_kept() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now().timestamp();
        db.store_at("austen", &sample(), now - 86_401).await.unwrap();

        assert!(db.lookup("austen", DAY).await.unwrap().is_none());
        assert_eq!(row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_age_equal_to_max_age_is_hit() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store_at("austen", &sample(), 1_000).await.unwrap();

        assert!(db.lookup_at("austen", DAY, 1_000 + 86_400).await.unwrap().is_some());
        assert!(db.lookup_at("austen", DAY, 1_000 + 86_401).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_results() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store("austen", &sample()).await.unwrap();
        db.store("austen", &sample()[..1]).await.unwrap();

        let cached = db.lookup("austen", DAY).await.unwrap().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "Pride and Prejudice");
    }

    #[tokio::test]
    async fn test_key_is_raw_query() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.store("Emma", &sample()).await.unwrap();

        assert!(db.lookup("emma", DAY).await.unwrap().is_none());
        assert!(db.lookup(" Emma", DAY).await.unwrap().is_none());
        assert!(db.lookup("Emma", DAY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now().timestamp();
        db.store_at("old", &sample(), now - 2 * 86_400).await.unwrap();
        db.store("fresh", &sample()).await.unwrap();

        assert_eq!(db.purge_stale_searches(DAY).await.unwrap(), 1);
        assert!(db.lookup("fresh", DAY).await.unwrap().is_some());

        assert_eq!(db.clear_search_cache().await.unwrap(), 1);
        assert_eq!(row_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_corrupt_row_surfaces_error() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO search_cache (query, results_json, stored_at) VALUES ('bad', '{oops', ?1)",
                    params![Utc::now().timestamp()],
                )
            })
            .await
            .unwrap();

        assert!(matches!(db.lookup("bad", DAY).await, Err(Error::Serialization(_))));
    }
}
