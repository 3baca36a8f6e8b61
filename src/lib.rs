//! # Sandhi Post-Processor
//!
//! Ranks machine-generated sandhi split candidates and keeps the best few
//! per word:
//! - Composite, deterministic ranking (manual tags, segment count, length,
//!   similarity, negative segments)
//! - Deduplication by (word, split)
//! - Top-five selection biased to the least fragmented split
//! - SQLite persistence, dictionary export and frequency reports
//!
//! ## Example Usage
//!
//! ```rust
//! use sandhi_postprocess::{CandidateBatch, RawCandidate, RankingEngine, NegativeSet};
//!
//! let batch = CandidateBatch::new("matches", vec![
//!     RawCandidate::new("atta", "a + tta"),
//!     RawCandidate::new("atta", "at + ta").with_process("manual"),
//! ]);
//!
//! let engine = RankingEngine::default();
//! let (_table, mapping) = engine.rank_and_select(&[batch], &NegativeSet::new());
//!
//! assert_eq!(mapping.get("atta").unwrap(), ["at + ta", "a + tta"]);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod export;
pub mod loader;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod store;

// Re-export primary types
pub use crate::core::{CandidateBatch, CandidateRecord, RawCandidate, ResultMapping};
pub use config::{PostprocessConfig, RankingOptions, ScorerKind, SimilarityMode};
pub use engine::{RunSummary, SandhiPostprocessor};
pub use error::{MalformedRecord, Result, SandhiError};
pub use ranking::{RankedTable, RankingEngine, TopNSelector};
pub use scoring::{NegativeSet, SimilarityScorer};
pub use store::{SplitStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
