//! Reading match tables and lexical side inputs from disk.

use std::collections::HashMap;
use std::path::Path;

use crate::config::InputPaths;
use crate::core::{CandidateBatch, RawCandidate};
use crate::error::{MalformedRecord, Result, SandhiError};
use crate::scoring::NegativeSet;

/// Read a tab-separated match table with a header row.
///
/// Columns `word`, `split`, `process` and `rules` are used; any others are
/// ignored. Rows that cannot be decoded are kept as `MalformedRecord`s on the
/// batch. A file that cannot be opened or has no readable header is an error.
pub fn load_batch(path: impl AsRef<Path>, name: impl Into<String>) -> Result<CandidateBatch> {
    let path = path.as_ref();
    let name = name.into();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "word") || !headers.iter().any(|h| h == "split") {
        return Err(SandhiError::Other(format!(
            "{} has no word/split columns",
            path.display()
        )));
    }

    let mut batch = CandidateBatch::new(name, Vec::new());
    for (i, result) in reader.deserialize::<RawCandidate>().enumerate() {
        match result {
            Ok(row) => batch.rows.push(row.with_row(i + 1)),
            Err(e) => batch
                .unreadable
                .push(MalformedRecord::new(&batch.name, i + 1, e.to_string())),
        }
    }

    tracing::info!(
        "📥 Loaded {} rows from {} ({} unreadable)",
        batch.rows.len(),
        path.display(),
        batch.unreadable.len()
    );
    Ok(batch)
}

/// Load the primary table and, when enabled, the secondary one after it
pub fn load_batches(inputs: &InputPaths, include_secondary: bool) -> Result<Vec<CandidateBatch>> {
    let mut batches = vec![load_batch(&inputs.primary, "primary")?];

    match (&inputs.secondary, include_secondary) {
        (Some(path), true) => batches.push(load_batch(path, "secondary")?),
        (None, true) => tracing::debug!("No secondary batch configured"),
        (_, false) => tracing::info!("⏭️ Secondary batch disabled"),
    }

    Ok(batches)
}

/// Load negative inflections: a JSON array for `.json` files, otherwise one
/// form per line
pub fn load_negative_set(path: impl AsRef<Path>) -> Result<NegativeSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let set: NegativeSet = if is_json(path) {
        serde_json::from_str::<Vec<String>>(&content)?
            .into_iter()
            .collect()
    } else {
        content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    };

    tracing::info!("📥 Loaded {} negative forms from {}", set.len(), path.display());
    Ok(set)
}

/// Load word -> breakup HTML fragment
pub fn load_breakups(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let breakups: HashMap<String, String> = serde_json::from_str(&content)?;
    tracing::info!("📥 Loaded {} breakups from {}", breakups.len(), path.display());
    Ok(breakups)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
