use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::ResultMapping;
use crate::error::{Result, SandhiError};
use crate::store::{SplitStore, StoreStats};

/// SQLite-backed split store
///
/// ```sql
/// CREATE TABLE sandhi (
///     sandhi TEXT PRIMARY KEY,
///     split TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
///
/// `split` holds the ordered splits joined with commas.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sandhi (
                sandhi TEXT PRIMARY KEY,
                split TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SandhiError::Store("connection mutex poisoned".into()))
    }
}

fn split_column(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(',').map(str::to_string).collect()
}

#[async_trait]
impl SplitStore for SqliteStore {
    async fn replace_all(&self, mapping: &ResultMapping) -> Result<u64> {
        let mut conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        // dropping the transaction without commit rolls back
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM sandhi", [])?;

        let mut written = 0u64;
        {
            let mut insert =
                tx.prepare("INSERT INTO sandhi (sandhi, split, updated_at) VALUES (?1, ?2, ?3)")?;
            for (word, splits) in mapping.iter() {
                insert.execute(params![word, splits.join(","), now])?;
                written += 1;
            }
        }
        tx.commit()?;

        tracing::info!("💾 Stored {} words", written);
        Ok(written)
    }

    async fn get(&self, word: &str) -> Result<Option<Vec<String>>> {
        let conn = self.lock()?;

        let joined: Option<String> = conn
            .query_row(
                "SELECT split FROM sandhi WHERE sandhi = ?",
                params![word],
                |row| row.get(0),
            )
            .optional()?;

        Ok(joined.map(|s| split_column(&s)))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock()?;

        let total_words: u64 =
            conn.query_row("SELECT COUNT(*) FROM sandhi", [], |row| row.get(0))?;

        let mut total_splits = 0u64;
        {
            let mut stmt = conn.prepare("SELECT split FROM sandhi")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for joined in rows {
                total_splits += split_column(&joined?).len() as u64;
            }
        }

        let avg_splits = if total_words > 0 {
            total_splits as f64 / total_words as f64
        } else {
            0.0
        };

        let last_updated: Option<DateTime<Utc>> = conn
            .query_row("SELECT MAX(updated_at) FROM sandhi", [], |row| {
                row.get::<_, Option<String>>(0)
            })?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(StoreStats {
            total_words,
            total_splits,
            avg_splits,
            last_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: Vec<(&str, Vec<&str>)>) -> ResultMapping {
        let mut m = ResultMapping::new();
        for (word, splits) in entries {
            m.insert_first(word, splits[0]);
            for s in &splits[1..] {
                m.push_split(word, s);
            }
        }
        m
    }

    #[tokio::test]
    async fn test_store_create() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.avg_splits, 0.0);
        assert!(stats.last_updated.is_none());
    }

    #[tokio::test]
    async fn test_replace_and_get() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let m = mapping(vec![("atta", vec!["at + ta", "a + tta"]), ("ca", vec!["ca"])]);

        assert_eq!(store.replace_all(&m).await.unwrap(), 2);

        let splits = store.get("atta").await.unwrap().unwrap();
        assert_eq!(splits, vec!["at + ta", "a + tta"]);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_drops_old_words() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        store
            .replace_all(&mapping(vec![("old", vec!["o + ld"])]))
            .await
            .unwrap();
        store
            .replace_all(&mapping(vec![("new", vec!["n + ew"])]))
            .await
            .unwrap();

        assert!(store.get("old").await.unwrap().is_none());
        assert!(store.get("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_mapping() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        store
            .replace_all(&mapping(vec![("old", vec!["o + ld"])]))
            .await
            .unwrap();

        store
            .conn
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON sandhi
                 WHEN NEW.sandhi = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store
            .replace_all(&mapping(vec![("new", vec!["n + ew"]), ("bad", vec!["b + ad"])]))
            .await;
        assert!(matches!(result, Err(SandhiError::Database(_))));

        assert_eq!(store.get("old").await.unwrap().unwrap(), vec!["o + ld"]);
        assert!(store.get("new").await.unwrap().is_none());
        assert_eq!(store.stats().await.unwrap().total_words, 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let m = mapping(vec![("a", vec!["a1", "a2", "a3"]), ("b", vec!["b1"])]);
        store.replace_all(&m).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.total_splits, 4);
        assert_eq!(stats.avg_splits, 2.0);
        assert!(stats.last_updated.is_some());
    }
}
