use thiserror::Error;

/// Main error type for the post-processor
#[derive(Error, Debug)]
pub enum SandhiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Tabular input/output errors
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Dictionary archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Split store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Dictionary export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for SandhiError {
    fn from(s: String) -> Self {
        SandhiError::Other(s)
    }
}

impl From<&str> for SandhiError {
    fn from(s: &str) -> Self {
        SandhiError::Other(s.to_string())
    }
}

/// A raw row that could not become a candidate record.
///
/// These are collected and counted, never propagated: one bad row must not
/// abort the batch it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed record in batch '{batch}' at row {row}: {reason}")]
pub struct MalformedRecord {
    pub batch: String,
    /// 1-based data row number within its batch
    pub row: usize,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(batch: impl Into<String>, row: usize, reason: impl Into<String>) -> Self {
        Self {
            batch: batch.into(),
            row,
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SandhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_display() {
        let err = MalformedRecord::new("matches", 3, "missing split");
        assert_eq!(
            err.to_string(),
            "Malformed record in batch 'matches' at row 3: missing split"
        );
    }

    #[test]
    fn test_from_str() {
        let err: SandhiError = "boom".into();
        assert!(matches!(err, SandhiError::Other(ref m) if m == "boom"));
    }
}
