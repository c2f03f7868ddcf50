//! Favorite records.
//!
//! Favorites are keyed by the record's normalized `title|author` key and
//! never expire. Listing returns the most recently added first.

use super::connection::CacheDb;
use crate::Error;
use crate::record::AggregatedRecord;
use chrono::Utc;
use tokio_rusqlite::params;

impl CacheDb {
    /// Add or refresh a favorite. Re-adding moves it to the front of the list.
    pub async fn add_favorite(&self, record: &AggregatedRecord) -> Result<(), Error> {
        let id = record.key();
        let title = record.title.clone();
        let author = record.author.clone();
        let data_json = serde_json::to_string(record)?;
        let added_at = Utc::now().timestamp();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR REPLACE INTO favorites (id, title, author, data_json, added_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, title, author, data_json, added_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove a favorite. Returns true if it existed.
    pub async fn remove_favorite(&self, record: &AggregatedRecord) -> Result<bool, Error> {
        let id = record.key();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_favorite(&self, record: &AggregatedRecord) -> Result<bool, Error> {
        let id = record.key();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM favorites WHERE id = ?1)",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Flip the favorite state of `record` in one call.
    ///
    /// Returns the new state: true if the record is now a favorite.
    pub async fn toggle_favorite(&self, record: &AggregatedRecord) -> Result<bool, Error> {
        let id = record.key();
        let title = record.title.clone();
        let author = record.author.clone();
        let data_json = serde_json::to_string(record)?;
        let added_at = Utc::now().timestamp();

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                let removed = tx.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
                if removed == 0 {
                    tx.execute(
                        "INSERT INTO favorites (id, title, author, data_json, added_at)
                        VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![id, title, author, data_json, added_at],
                    )?;
                }
                tx.commit()?;
                Ok(removed == 0)
            })
            .await
            .map_err(Error::from)
    }

    /// All favorites, most recently added first.
    ///
    /// Rows whose stored JSON no longer decodes are skipped with a warning.
    pub async fn list_favorites(&self) -> Result<Vec<AggregatedRecord>, Error> {
        let rows = self
            .conn
            .call(|conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT id, data_json FROM favorites ORDER BY added_at DESC, rowid DESC")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, json)| match serde_json::from_str(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(id = %id, "skipping unreadable favorite: {}", e);
                    None
                }
            })
            .collect())
    }
}
