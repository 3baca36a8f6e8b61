use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PostprocessConfig;
use crate::core::{CandidateBatch, ResultMapping};
use crate::error::{Result, SandhiError};
use crate::export::{build_entries, style_block, DictionaryPackage};
use crate::loader;
use crate::ranking::{RankedTable, RankingEngine};
use crate::report;
use crate::scoring::{scorer_for, NegativeSet};
use crate::store::{SplitStore, SqliteStore};

/// Counts from one full run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates_removed: usize,
    pub records_ranked: usize,
    pub words_selected: usize,
    pub splits_selected: usize,
    pub rows_persisted: u64,
    pub entries_exported: usize,
    pub report_files: usize,
    pub elapsed_ms: f64,
}

/// Runs the whole post-processing pipeline for one configuration:
/// load, rank, select, then hand the results to the output collaborators.
pub struct SandhiPostprocessor {
    config: PostprocessConfig,
    ranking: RankingEngine,
    store: Option<Arc<dyn SplitStore>>,
}

impl SandhiPostprocessor {
    /// Build from config, opening the SQLite store when a database is set
    pub async fn new(config: PostprocessConfig) -> Result<Self> {
        config.validate()?;

        let store: Option<Arc<dyn SplitStore>> = match &config.outputs.database {
            Some(path) => {
                let path = path
                    .to_str()
                    .ok_or_else(|| SandhiError::Config("database path is not UTF-8".into()))?;
                Some(Arc::new(SqliteStore::new(path).await?))
            }
            None => None,
        };

        Ok(Self::with_store(config, store))
    }

    /// Build with an explicit store (or none)
    pub fn with_store(config: PostprocessConfig, store: Option<Arc<dyn SplitStore>>) -> Self {
        let ranking = RankingEngine::new(scorer_for(config.scorer), config.ranking_options());
        tracing::debug!("🔧 Using {} scorer, {:?} mode", ranking.scorer_name(), config.similarity);
        Self {
            config,
            ranking,
            store,
        }
    }

    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&Arc<dyn SplitStore>> {
        self.store.as_ref()
    }

    /// Rank and select already-loaded batches
    pub fn process(
        &self,
        batches: &[CandidateBatch],
        negatives: &NegativeSet,
    ) -> (RankedTable, ResultMapping) {
        self.ranking.rank_and_select(batches, negatives)
    }

    /// Full run from the configured inputs to every configured output
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let inputs = &self.config.inputs;

        let batches = loader::load_batches(inputs, self.config.include_secondary)?;
        let negatives = match &inputs.negatives {
            Some(path) => loader::load_negative_set(path)?,
            None => {
                tracing::warn!("⚠️ No negative inflection set configured");
                NegativeSet::new()
            }
        };

        let (table, mapping) = self.process(&batches, &negatives);
        let mut summary = self.publish(&table, &mapping).await?;
        summary.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            "✅ Run finished: {} words from {} rows in {:.1}ms",
            summary.words_selected,
            summary.rows_read,
            summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Hand a finished table and mapping to the output collaborators
    pub async fn publish(&self, table: &RankedTable, mapping: &ResultMapping) -> Result<RunSummary> {
        let outputs = &self.config.outputs;
        let mut summary = RunSummary {
            rows_read: table.rows_read,
            rows_skipped: table.skipped.len(),
            duplicates_removed: table.duplicates_removed,
            records_ranked: table.len(),
            words_selected: mapping.len(),
            splits_selected: mapping.split_total(),
            ..Default::default()
        };

        if let Some(path) = &outputs.ranked_table {
            report::write_ranked_table(path, &table.records)?;
        }

        if let Some(store) = &self.store {
            summary.rows_persisted = store.replace_all(mapping).await?;
        }

        if let Some(dir) = &outputs.report_dir {
            summary.report_files =
                report::write_reports(dir, &table.records, &self.config.separator)?;
        }

        if outputs.package.is_some() || outputs.stardict.is_some() {
            let breakups = match &self.config.inputs.breakups {
                Some(p) => loader::load_breakups(p)?,
                None => HashMap::new(),
            };
            let css = match &outputs.css {
                Some(p) => style_block(&std::fs::read_to_string(p)?),
                None => String::new(),
            };
            let entries = build_entries(mapping, &breakups, &css);
            summary.entries_exported = entries.len();

            let package = DictionaryPackage::new(&self.config.dictionary, entries);
            if let Some(path) = &outputs.package {
                package.write(path)?;
            }
            if let Some(path) = &outputs.stardict {
                package.write_stardict(path)?;
            }
        }

        Ok(summary)
    }
}
