use std::collections::HashMap;

use crate::config::DEFAULT_MAX_SPLITS;
use crate::core::{CandidateRecord, ResultMapping};

/// Keeps the best splits per word from a ranked table.
///
/// The first record seen for a word fixes its reference segment count. Later
/// records are accepted only while the list is short of `max_splits` and they
/// are no more fragmented than that first split.
#[derive(Debug, Clone, Copy)]
pub struct TopNSelector {
    max_splits: usize,
}

impl TopNSelector {
    pub fn new(max_splits: usize) -> Self {
        Self {
            max_splits: max_splits.max(1),
        }
    }

    pub fn max_splits(&self) -> usize {
        self.max_splits
    }

    /// Walk `records` once, in order
    pub fn select(&self, records: &[CandidateRecord]) -> ResultMapping {
        let mut mapping = ResultMapping::new();
        let mut reference: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let word = record.word.as_str();
            match reference.get(word) {
                None => {
                    mapping.insert_first(word, &record.split);
                    reference.insert(word, record.segment_count);
                }
                Some(&reference_count) => {
                    let kept = mapping.get(word).unwrap_or_default();
                    if kept.len() < self.max_splits
                        && record.segment_count <= reference_count
                        && !kept.contains(&record.split)
                    {
                        mapping.push_split(word, &record.split);
                    }
                }
            }
        }

        tracing::info!(
            "🎯 Selected {} splits for {} words",
            mapping.split_total(),
            mapping.len()
        );
        mapping
    }
}

impl Default for TopNSelector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPLITS)
    }
}
