use serde::{Deserialize, Serialize};

use crate::error::MalformedRecord;

/// One row of an upstream match table, exactly as read.
///
/// `word` and `split` are optional here so that a row missing either still
/// deserializes and can be reported instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub word: Option<String>,

    #[serde(default)]
    pub split: Option<String>,

    /// Process annotations (manual, spelling, variant, ...)
    #[serde(default)]
    pub process: Option<String>,

    /// Comma-delimited rule identifiers
    #[serde(default)]
    pub rules: Option<String>,

    /// Data row in the source table, set by the loader
    #[serde(skip)]
    pub row: Option<usize>,
}

impl RawCandidate {
    pub fn new(word: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            word: Some(word.into()),
            split: Some(split.into()),
            process: None,
            rules: None,
            row: None,
        }
    }

    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = Some(process.into());
        self
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// A named, ordered batch of raw rows
#[derive(Debug, Clone, Default)]
pub struct CandidateBatch {
    pub name: String,
    pub rows: Vec<RawCandidate>,
    /// Rows the loader could not parse at all
    pub unreadable: Vec<MalformedRecord>,
}

impl CandidateBatch {
    pub fn new(name: impl Into<String>, rows: Vec<RawCandidate>) -> Self {
        Self {
            name: name.into(),
            rows,
            unreadable: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A validated (word, split) pair with its ranking keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub word: String,
    pub split: String,
    pub process: String,
    pub rules: Vec<String>,

    /// Position in the concatenated input, the last tie-break
    pub ordinal: usize,

    pub is_manual: bool,
    pub segment_count: usize,
    pub char_count: usize,
    pub occurrence_count: usize,
    pub similarity_ratio: f64,
    pub negation_count: usize,
}

impl CandidateRecord {
    /// Validate a raw row. Derived fields start zeroed and are filled in by
    /// the ranking engine once the whole batch is known.
    pub fn from_raw(
        raw: &RawCandidate,
        ordinal: usize,
        batch: &str,
        row: usize,
    ) -> Result<Self, MalformedRecord> {
        let word = required(raw.word.as_deref())
            .ok_or_else(|| MalformedRecord::new(batch, row, "missing word"))?;
        let split = required(raw.split.as_deref())
            .ok_or_else(|| MalformedRecord::new(batch, row, "missing split"))?;

        Ok(Self {
            word: word.to_string(),
            split: split.to_string(),
            process: raw.process.clone().unwrap_or_default(),
            rules: parse_rules(raw.rules.as_deref().unwrap_or_default()),
            ordinal,
            is_manual: false,
            segment_count: 1,
            char_count: split.chars().count(),
            occurrence_count: 0,
            similarity_ratio: 0.0,
            negation_count: 0,
        })
    }

    /// Segments of the split. A split without the separator is one segment.
    pub fn segments<'a>(&'a self, separator: &'a str) -> impl Iterator<Item = &'a str> {
        self.split.split(separator)
    }

    /// Rules joined back into their raw form
    pub fn rules_joined(&self) -> String {
        self.rules.join(",")
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_rules(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of segments in a split
pub fn segment_count(split: &str, separator: &str) -> usize {
    split.matches(separator).count() + 1
}

/// Whether any manual marker occurs in the process annotations
pub fn is_manual(process: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && process.contains(marker.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["spelling".into(), "variant".into(), "manual".into()]
    }

    #[test]
    fn test_from_raw_valid() {
        let raw = RawCandidate::new("atta", "at + ta")
            .with_process("manual")
            .with_rules("r2, r7");
        let record = CandidateRecord::from_raw(&raw, 4, "matches", 5).unwrap();
        assert_eq!(record.word, "atta");
        assert_eq!(record.split, "at + ta");
        assert_eq!(record.rules, vec!["r2", "r7"]);
        assert_eq!(record.ordinal, 4);
        assert_eq!(record.char_count, 7);
    }

    #[test]
    fn test_from_raw_missing_fields() {
        let no_word = RawCandidate {
            split: Some("a + b".into()),
            ..Default::default()
        };
        let err = CandidateRecord::from_raw(&no_word, 0, "matches", 1).unwrap_err();
        assert_eq!(err.reason, "missing word");

        let blank_split = RawCandidate::new("ab", "   ");
        let err = CandidateRecord::from_raw(&blank_split, 0, "do", 9).unwrap_err();
        assert_eq!(err.reason, "missing split");
        assert_eq!(err.batch, "do");
        assert_eq!(err.row, 9);
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count("a + tta", " + "), 2);
        assert_eq!(segment_count("a + b + c", " + "), 3);
        assert_eq!(segment_count("atta", " + "), 1);
        // drifted formatting is a single segment
        assert_eq!(segment_count("a+tta", " + "), 1);
    }

    #[test]
    fn test_is_manual() {
        assert!(is_manual("manual", &markers()));
        assert!(is_manual("spelling,rule", &markers()));
        assert!(is_manual("xvariantx", &markers()));
        assert!(!is_manual("", &markers()));
        assert!(!is_manual("auto", &markers()));
    }

    #[test]
    fn test_char_count_counts_code_points() {
        let raw = RawCandidate::new("ārammaṇa", "ārammaṇa + ṃ");
        let record = CandidateRecord::from_raw(&raw, 0, "matches", 1).unwrap();
        assert_eq!(record.char_count, 12);
    }
}
