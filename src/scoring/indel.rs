use rapidfuzz::distance::indel;

use crate::scoring::SimilarityScorer;

/// rapidfuzz-based scorer: normalized indel similarity, `2 * LCS / (|a| + |b|)`
/// over the longest common subsequence instead of contiguous blocks
pub struct IndelScorer;

impl IndelScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IndelScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for IndelScorer {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        indel::normalized_similarity(a.chars(), b.chars())
    }

    fn name(&self) -> &str {
        "indel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indel_exact_match() {
        let scorer = IndelScorer::new();
        assert_eq!(scorer.ratio("dhammacakka", "dhammacakka"), 1.0);
        assert_eq!(scorer.ratio("", ""), 1.0);
    }

    #[test]
    fn test_indel_ordering() {
        let scorer = IndelScorer::new();
        let close = scorer.ratio("cattāro", "catuāro");
        let far = scorer.ratio("cattāro", "bhūtaṃ");
        assert!(close > far);
        assert!(close < 1.0);
    }
}
