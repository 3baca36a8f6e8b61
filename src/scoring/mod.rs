pub mod indel;
pub mod matching_blocks;
pub mod negation;

use std::sync::Arc;

use crate::config::{ScorerKind, SimilarityMode};

pub use indel::IndelScorer;
pub use matching_blocks::MatchingBlocksScorer;
pub use negation::{negation_count, NegativeSet};

/// Trait for string similarity implementations
pub trait SimilarityScorer: Send + Sync {
    /// Similarity of `a` and `b` in [0, 1]; identical inputs always score 1.0
    fn ratio(&self, a: &str, b: &str) -> f64;

    /// Get scorer name for logging
    fn name(&self) -> &str;
}

/// Build the scorer selected in the configuration
pub fn scorer_for(kind: ScorerKind) -> Arc<dyn SimilarityScorer> {
    match kind {
        ScorerKind::MatchingBlocks => Arc::new(MatchingBlocksScorer::new()),
        ScorerKind::Indel => Arc::new(IndelScorer::new()),
    }
}

/// Score one candidate according to `mode`
pub fn similarity_for(
    scorer: &dyn SimilarityScorer,
    mode: SimilarityMode,
    word: &str,
    split: &str,
    separator: &str,
) -> f64 {
    let stripped = split.replace(separator, "");
    match mode {
        SimilarityMode::SplitSelf => scorer.ratio(&stripped, &stripped),
        SimilarityMode::SplitAgainstStripped => scorer.ratio(split, &stripped),
        SimilarityMode::WordAgainstSplit => scorer.ratio(word, &stripped),
    }
}
