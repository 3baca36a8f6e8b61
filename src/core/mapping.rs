use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Word -> ordered best splits.
///
/// Words iterate in the order they were first inserted, which for a mapping
/// built by the selector is the order they first appear in the ranked table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMapping {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.index
            .get(word)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Start a new word with its first split. Returns false if the word is
    /// already present.
    pub(crate) fn insert_first(&mut self, word: &str, split: &str) -> bool {
        if self.index.contains_key(word) {
            return false;
        }
        self.index.insert(word.to_string(), self.entries.len());
        self.entries
            .push((word.to_string(), vec![split.to_string()]));
        true
    }

    /// Append a split to an existing word
    pub(crate) fn push_split(&mut self, word: &str, split: &str) {
        if let Some(&i) = self.index.get(word) {
            self.entries[i].1.push(split.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(word, splits)| (word.as_str(), splits.as_slice()))
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(word, _)| word.as_str())
    }

    /// Total number of splits across all words
    pub fn split_total(&self) -> usize {
        self.entries.iter().map(|(_, splits)| splits.len()).sum()
    }

    /// Comma-joined form stored by the persistence layer
    pub fn joined(&self, word: &str) -> Option<String> {
        self.get(word).map(|splits| splits.join(","))
    }
}

impl Serialize for ResultMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, splits) in &self.entries {
            map.serialize_entry(word, splits)?;
        }
        map.end()
    }
}
