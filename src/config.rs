use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SandhiError};

/// Segment separator used by the upstream splitter
pub const DEFAULT_SEPARATOR: &str = " + ";

/// Maximum splits kept per word
pub const DEFAULT_MAX_SPLITS: usize = 5;

/// Which strings are handed to the similarity scorer.
///
/// `SplitSelf` compares the stripped split with itself, so the ratio is 1.0
/// for every record and key 4 of the ranking never separates candidates.
/// It is the default because it reproduces the published tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// Stripped split vs stripped split
    #[default]
    SplitSelf,
    /// Split as written (separators included) vs stripped split
    SplitAgainstStripped,
    /// Undivided word vs stripped split
    WordAgainstSplit,
}

/// Similarity scorer implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Longest matching blocks ratio
    #[default]
    MatchingBlocks,
    /// rapidfuzz normalized indel similarity
    Indel,
}

/// Options consumed by the ranking engine and selector
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOptions {
    pub separator: String,
    pub max_splits: usize,
    pub manual_markers: Vec<String>,
    pub similarity: SimilarityMode,
    pub parallel: bool,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_splits: DEFAULT_MAX_SPLITS,
            manual_markers: default_manual_markers(),
            similarity: SimilarityMode::default(),
            parallel: false,
        }
    }
}

/// Input locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Main match table
    pub primary: PathBuf,
    /// Additional match table, read only when `include_secondary` is set
    pub secondary: Option<PathBuf>,
    /// Negative inflection forms
    pub negatives: Option<PathBuf>,
    /// Word -> breakup HTML fragment
    pub breakups: Option<PathBuf>,
}

/// Output locations. Any step whose path is unset is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub database: Option<PathBuf>,
    pub ranked_table: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub package: Option<PathBuf>,
    /// StarDict zip (`.ifo`, `.idx`, `.dict`)
    pub stardict: Option<PathBuf>,
    pub css: Option<PathBuf>,
}

/// Dictionary package metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryMeta {
    pub bookname: String,
    pub author: String,
    pub description: String,
    pub website: String,
}

impl Default for DictionaryMeta {
    fn default() -> Self {
        Self {
            bookname: "DPD Splitter".to_string(),
            author: "Bodhirasa".to_string(),
            description: "DPD Splitter + DPR Analysis".to_string(),
            website: "https://digitalpalidictionary.github.io/".to_string(),
        }
    }
}

/// Full run configuration, usually loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub separator: String,
    pub max_splits: usize,
    pub manual_markers: Vec<String>,
    pub similarity: SimilarityMode,
    pub scorer: ScorerKind,
    pub include_secondary: bool,
    pub parallel: bool,
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    pub dictionary: DictionaryMeta,
}

fn default_manual_markers() -> Vec<String> {
    vec![
        "spelling".to_string(),
        "variant".to_string(),
        "manual".to_string(),
    ]
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_splits: DEFAULT_MAX_SPLITS,
            manual_markers: default_manual_markers(),
            similarity: SimilarityMode::default(),
            scorer: ScorerKind::default(),
            include_secondary: true,
            parallel: false,
            inputs: InputPaths::default(),
            outputs: OutputPaths::default(),
            dictionary: DictionaryMeta::default(),
        }
    }
}

impl PostprocessConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SandhiError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(SandhiError::Config("separator must not be empty".into()));
        }
        if self.max_splits == 0 {
            return Err(SandhiError::Config("max_splits must be at least 1".into()));
        }
        Ok(())
    }

    pub fn ranking_options(&self) -> RankingOptions {
        RankingOptions {
            separator: self.separator.clone(),
            max_splits: self.max_splits,
            manual_markers: self.manual_markers.clone(),
            similarity: self.similarity,
            parallel: self.parallel,
        }
    }
}
