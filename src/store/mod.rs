pub mod sqlite;

use async_trait::async_trait;

use crate::core::ResultMapping;
use crate::error::Result;

pub use sqlite::SqliteStore;

/// Trait for persisted split mappings
#[async_trait]
pub trait SplitStore: Send + Sync {
    /// Replace every stored word with the contents of `mapping`.
    ///
    /// Either the whole mapping is stored or the previous contents remain.
    /// Returns the number of words written.
    async fn replace_all(&self, mapping: &ResultMapping) -> Result<u64>;

    /// Stored splits for one word
    async fn get(&self, word: &str) -> Result<Option<Vec<String>>>;

    /// Get store statistics
    async fn stats(&self) -> Result<StoreStats>;
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub total_words: u64,
    pub total_splits: u64,
    pub avg_splits: f64,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}
