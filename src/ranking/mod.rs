pub mod selector;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::RankingOptions;
use crate::core::record::{is_manual, segment_count};
use crate::core::{CandidateBatch, CandidateRecord, ResultMapping};
use crate::error::MalformedRecord;
use crate::scoring::{
    negation_count, similarity_for, MatchingBlocksScorer, NegativeSet, SimilarityScorer,
};

pub use selector::TopNSelector;

/// Ranked, deduplicated candidates plus what was dropped on the way
#[derive(Debug, Clone, Default)]
pub struct RankedTable {
    /// Best first; at most one record per (word, split)
    pub records: Vec<CandidateRecord>,
    /// Rows rejected during validation or parsing
    pub skipped: Vec<MalformedRecord>,
    /// Raw rows seen across all batches, including skipped ones
    pub rows_read: usize,
    pub duplicates_removed: usize,
}

impl RankedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Orders and deduplicates candidate splits.
///
/// Ranking is a pure function of the batches (in the order given), the
/// negative set, and the options. Running it twice gives identical output.
pub struct RankingEngine {
    scorer: Arc<dyn SimilarityScorer>,
    options: RankingOptions,
}

impl RankingEngine {
    pub fn new(scorer: Arc<dyn SimilarityScorer>, options: RankingOptions) -> Self {
        Self { scorer, options }
    }

    pub fn options(&self) -> &RankingOptions {
        &self.options
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Concatenate, score, sort and deduplicate
    pub fn rank(&self, batches: &[CandidateBatch], negatives: &NegativeSet) -> RankedTable {
        let (mut records, skipped, rows_read) = self.collect(batches);

        if !skipped.is_empty() {
            tracing::warn!("⚠️ Skipped {} malformed rows", skipped.len());
            for issue in skipped.iter().take(10) {
                tracing::debug!("{}", issue);
            }
        }

        if records.is_empty() {
            tracing::warn!("⚠️ No usable candidate rows in {} batches", batches.len());
            return RankedTable {
                records,
                skipped,
                rows_read,
                duplicates_removed: 0,
            };
        }

        self.derive_fields(&mut records, negatives);

        // stable, and the ordinal makes every key unique anyway
        records.sort_by(compare_records);

        let before = records.len();
        let mut seen: HashSet<(String, String)> = HashSet::with_capacity(before);
        records.retain(|r| seen.insert((r.word.clone(), r.split.clone())));
        let duplicates_removed = before - records.len();

        tracing::info!(
            "✅ Ranked {} candidates ({} duplicates dropped) using {}",
            records.len(),
            duplicates_removed,
            self.scorer.name()
        );

        RankedTable {
            records,
            skipped,
            rows_read,
            duplicates_removed,
        }
    }

    /// Rank, then keep the best splits per word
    pub fn rank_and_select(
        &self,
        batches: &[CandidateBatch],
        negatives: &NegativeSet,
    ) -> (RankedTable, ResultMapping) {
        let table = self.rank(batches, negatives);
        let mapping = TopNSelector::new(self.options.max_splits).select(&table.records);
        (table, mapping)
    }

    fn collect(
        &self,
        batches: &[CandidateBatch],
    ) -> (Vec<CandidateRecord>, Vec<MalformedRecord>, usize) {
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut rows_read = 0;

        for batch in batches {
            tracing::debug!("Batch '{}': {} rows", batch.name, batch.len());
            rows_read += batch.len() + batch.unreadable.len();
            skipped.extend(batch.unreadable.iter().cloned());

            for (i, raw) in batch.rows.iter().enumerate() {
                let ordinal = records.len() + skipped.len();
                let row = raw.row.unwrap_or(i + 1);
                match CandidateRecord::from_raw(raw, ordinal, &batch.name, row) {
                    Ok(record) => records.push(record),
                    Err(issue) => skipped.push(issue),
                }
            }
        }

        (records, skipped, rows_read)
    }

    fn derive_fields(&self, records: &mut [CandidateRecord], negatives: &NegativeSet) {
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for record in records.iter() {
            *occurrences.entry(record.word.clone()).or_insert(0) += 1;
        }

        let options = &self.options;
        let scorer = self.scorer.as_ref();
        let occurrences = &occurrences;

        let derive = |record: &mut CandidateRecord| {
            let sep = options.separator.as_str();
            record.is_manual = is_manual(&record.process, &options.manual_markers);
            record.segment_count = segment_count(&record.split, sep);
            record.char_count = record.split.chars().count();
            record.occurrence_count = occurrences.get(&record.word).copied().unwrap_or(0);
            record.similarity_ratio =
                similarity_for(scorer, options.similarity, &record.word, &record.split, sep);
            record.negation_count = negation_count(&record.split, sep, negatives);
        };

        if options.parallel {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                records.par_iter_mut().for_each(derive);
                return;
            }
            #[cfg(not(feature = "parallel"))]
            tracing::warn!("⚠️ Parallel derivation requested but the `parallel` feature is off");
        }

        records.iter_mut().for_each(derive);
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(Arc::new(MatchingBlocksScorer::new()), RankingOptions::default())
    }
}

/// Composite ranking order, best first:
/// manual desc, segments asc, chars asc, similarity desc, negations asc,
/// then input position.
pub fn compare_records(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    b.is_manual
        .cmp(&a.is_manual)
        .then_with(|| a.segment_count.cmp(&b.segment_count))
        .then_with(|| a.char_count.cmp(&b.char_count))
        .then_with(|| b.similarity_ratio.total_cmp(&a.similarity_ratio))
        .then_with(|| a.negation_count.cmp(&b.negation_count))
        .then_with(|| a.ordinal.cmp(&b.ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityMode;
    use crate::core::RawCandidate;

    fn batch(name: &str, rows: &[(&str, &str, &str)]) -> CandidateBatch {
        CandidateBatch::new(
            name,
            rows.iter()
                .map(|(w, s, p)| RawCandidate::new(*w, *s).with_process(*p).with_rules("r1"))
                .collect(),
        )
    }

    #[test]
    fn test_manual_ranks_first() {
        let engine = RankingEngine::default();
        let batches = vec![batch(
            "matches",
            &[("atta", "a + tta", ""), ("atta", "at + ta", "manual")],
        )];

        let (table, mapping) = engine.rank_and_select(&batches, &NegativeSet::new());

        assert_eq!(table.records[0].split, "at + ta");
        assert!(table.records[0].is_manual);
        assert_eq!(mapping.get("atta").unwrap(), ["at + ta", "a + tta"]);
    }

    #[test]
    fn test_fewer_segments_then_shorter() {
        let engine = RankingEngine::default();
        let batches = vec![batch(
            "matches",
            &[
                ("abcde", "a + b + cde", ""),
                ("abcde", "abc + de", ""),
                ("abcde", "ab + cde", ""),
                ("abcde", "abcd + ee", ""),
            ],
        )];

        let table = engine.rank(&batches, &NegativeSet::new());
        let order: Vec<&str> = table.records.iter().map(|r| r.split.as_str()).collect();
        assert_eq!(order, vec!["abc + de", "ab + cde", "abcd + ee", "a + b + cde"]);
    }

    #[test]
    fn test_negations_break_ties() {
        let negatives: NegativeSet = ["atta".to_string()].into_iter().collect();
        let engine = RankingEngine::default();
        let batches = vec![batch(
            "matches",
            &[("xatta", "x + atta", ""), ("xatta", "x + btta", "")],
        )];

        let table = engine.rank(&batches, &negatives);
        assert_eq!(table.records[0].split, "x + btta");
        assert_eq!(table.records[1].negation_count, 1);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let engine = RankingEngine::default();
        let batches = vec![
            batch("first", &[("w", "a + b", "")]),
            batch("second", &[("w", "b + a", "")]),
        ];

        let table = engine.rank(&batches, &NegativeSet::new());
        assert_eq!(table.records[0].split, "a + b");
        assert_eq!(table.records[1].split, "b + a");

        let swapped = vec![batches[1].clone(), batches[0].clone()];
        let table = engine.rank(&swapped, &NegativeSet::new());
        assert_eq!(table.records[0].split, "b + a");
    }

    #[test]
    fn test_duplicates_across_batches() {
        let engine = RankingEngine::default();
        let batches = vec![
            batch("matches", &[("atta", "at + ta", "")]),
            batch("do", &[("atta", "at + ta", "manual")]),
        ];

        let table = engine.rank(&batches, &NegativeSet::new());
        assert_eq!(table.len(), 1);
        assert_eq!(table.duplicates_removed, 1);
        // the manual copy outranks and survives
        assert!(table.records[0].is_manual);
        assert_eq!(table.records[0].occurrence_count, 2);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let engine = RankingEngine::default();
        let mut b = batch("matches", &[("atta", "at + ta", "")]);
        b.rows.push(RawCandidate {
            word: Some("atta".into()),
            ..Default::default()
        });
        b.rows.push(RawCandidate::new("", "x + y"));

        let table = engine.rank(&[b], &NegativeSet::new());
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped.len(), 2);
        assert_eq!(table.rows_read, 3);
        assert_eq!(table.skipped[0].row, 2);
    }

    #[test]
    fn test_empty_input() {
        let engine = RankingEngine::default();
        let (table, mapping) = engine.rank_and_select(&[], &NegativeSet::new());
        assert!(table.is_empty());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_word_against_split_mode_orders_by_similarity() {
        let options = RankingOptions {
            similarity: SimilarityMode::WordAgainstSplit,
            ..RankingOptions::default()
        };
        let engine = RankingEngine::new(Arc::new(MatchingBlocksScorer::new()), options);
        // same segment and char counts; only the second reproduces the word
        let batches = vec![batch(
            "matches",
            &[("abcd", "ab + xd", ""), ("abcd", "ab + cd", "")],
        )];

        let table = engine.rank(&batches, &NegativeSet::new());
        assert_eq!(table.records[0].split, "ab + cd");
        assert_eq!(table.records[0].similarity_ratio, 1.0);
    }

    #[test]
    fn test_compare_records_is_total() {
        let raw = RawCandidate::new("w", "a + b");
        let a = CandidateRecord::from_raw(&raw, 0, "m", 1).unwrap();
        let mut b = a.clone();
        b.ordinal = 1;
        assert_eq!(compare_records(&a, &b), Ordering::Less);
        assert_eq!(compare_records(&b, &a), Ordering::Greater);
        assert_eq!(compare_records(&a, &a), Ordering::Equal);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_derivation_matches_sequential() {
        let rows: Vec<RawCandidate> = (0..500)
            .map(|i| {
                let split = format!("w{} + {}", i % 7, "na".repeat(i % 4 + 1));
                let process = if i % 11 == 0 { "manual" } else { "" };
                RawCandidate::new(format!("w{}", i % 37), split).with_process(process)
            })
            .collect();
        let batches = vec![CandidateBatch::new("matches", rows)];
        let negatives: NegativeSet = ["na".to_string()].into_iter().collect();

        let sequential = RankingEngine::default();
        let parallel = RankingEngine::new(
            Arc::new(MatchingBlocksScorer::new()),
            RankingOptions {
                parallel: true,
                ..RankingOptions::default()
            },
        );

        let (seq_table, seq_mapping) = sequential.rank_and_select(&batches, &negatives);
        let (par_table, par_mapping) = parallel.rank_and_select(&batches, &negatives);

        assert_eq!(seq_table.records, par_table.records);
        assert_eq!(seq_mapping, par_mapping);
        assert!(seq_table.records.iter().any(|r| r.negation_count > 0));
    }
}
