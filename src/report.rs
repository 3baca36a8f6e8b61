//! Frequency reports over the ranked table and the ranked table itself.

use std::collections::HashMap;
use std::path::Path;

use crate::core::CandidateRecord;
use crate::error::Result;

/// Segment length buckets; the last one holds everything at least this long
pub const LETTER_BUCKETS: usize = 10;

/// How often each rule produced a surviving candidate, most used first
pub fn rule_counts(records: &[CandidateRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for rule in &record.rules {
            *counts.entry(rule.as_str()).or_insert(0) += 1;
        }
    }
    sorted_counts(counts)
}

/// Segment frequencies bucketed by segment length in chars.
///
/// Index 0 holds length 1, index 9 holds length 10 and longer. Splits that
/// carry `<i>` markup are left out.
pub fn letter_counts(records: &[CandidateRecord], separator: &str) -> Vec<Vec<(String, usize)>> {
    let mut buckets: Vec<HashMap<&str, usize>> = vec![HashMap::new(); LETTER_BUCKETS];

    for record in records {
        if record.split.contains("<i>") {
            continue;
        }
        for segment in record.segments(separator) {
            let len = segment.chars().count();
            if len == 0 {
                continue;
            }
            let bucket = len.min(LETTER_BUCKETS) - 1;
            *buckets[bucket].entry(segment).or_insert(0) += 1;
        }
    }

    buckets.into_iter().map(sorted_counts).collect()
}

fn sorted_counts(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)?)
}

fn write_counts(path: &Path, header: Option<[&str; 2]>, counts: &[(String, usize)]) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for (key, count) in counts {
        writer.write_record([key.as_str(), &count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `rule_counts.tsv` and `letters1.tsv` .. `letters10.tsv` into `dir`.
/// Returns the number of files written.
pub fn write_reports(dir: impl AsRef<Path>, records: &[CandidateRecord], separator: &str) -> Result<usize> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    write_counts(
        &dir.join("rule_counts.tsv"),
        Some(["rule", "count"]),
        &rule_counts(records),
    )?;

    let letters = letter_counts(records, separator);
    for (i, bucket) in letters.iter().enumerate() {
        write_counts(&dir.join(format!("letters{}.tsv", i + 1)), None, bucket)?;
    }

    tracing::info!("📊 Wrote {} report files to {}", letters.len() + 1, dir.display());
    Ok(letters.len() + 1)
}

/// Write the ranked table with its derived columns
pub fn write_ranked_table(path: impl AsRef<Path>, records: &[CandidateRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = tsv_writer(path)?;

    writer.write_record([
        "word",
        "split",
        "process",
        "rules",
        "manual",
        "splitcount",
        "lettercount",
        "count",
        "ratio",
        "neg_count",
    ])?;

    for r in records {
        writer.write_record([
            r.word.as_str(),
            r.split.as_str(),
            r.process.as_str(),
            &r.rules_joined(),
            if r.is_manual { "1" } else { "0" },
            &r.segment_count.to_string(),
            &r.char_count.to_string(),
            &r.occurrence_count.to_string(),
            &r.similarity_ratio.to_string(),
            &r.negation_count.to_string(),
        ])?;
    }
    writer.flush()?;

    tracing::info!("📝 Wrote {} ranked rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawCandidate;
    use tempfile::TempDir;

    fn record(word: &str, split: &str, rules: &str) -> CandidateRecord {
        let raw = RawCandidate::new(word, split).with_rules(rules);
        CandidateRecord::from_raw(&raw, 0, "t", 1).unwrap()
    }

    #[test]
    fn test_rule_counts() {
        let records = vec![
            record("a", "a + b", "r1,r2"),
            record("b", "b + c", "r2"),
            record("c", "c", ""),
        ];
        let counts = rule_counts(&records);
        assert_eq!(counts, vec![("r2".to_string(), 2), ("r1".to_string(), 1)]);
    }

    #[test]
    fn test_letter_counts() {
        let records = vec![
            record("w1", "ca + dhammacakkappavattana", ""),
            record("w2", "ca + atta", ""),
            record("w3", "<i>ca</i> + x", ""),
        ];
        let letters = letter_counts(&records, " + ");
        assert_eq!(letters.len(), 10);
        assert_eq!(letters[1], vec![("ca".to_string(), 2)]);
        assert_eq!(letters[3], vec![("atta".to_string(), 1)]);
        assert_eq!(letters[9], vec![("dhammacakkappavattana".to_string(), 1)]);
        assert!(letters[0].is_empty());
    }

    #[test]
    fn test_write_reports_and_table() {
        let dir = TempDir::new().unwrap();
        let records = vec![record("atta", "at + ta", "r1")];

        let files = write_reports(dir.path().join("reports"), &records, " + ").unwrap();
        assert_eq!(files, 11);
        let rules = std::fs::read_to_string(dir.path().join("reports/rule_counts.tsv")).unwrap();
        assert_eq!(rules, "rule\tcount\nr1\t1\n");
        let two = std::fs::read_to_string(dir.path().join("reports/letters2.tsv")).unwrap();
        assert_eq!(two, "at\t1\nta\t1\n");

        let table = dir.path().join("matches_sorted.tsv");
        write_ranked_table(&table, &records).unwrap();
        let content = std::fs::read_to_string(&table).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("word\tsplit\tprocess"));
        assert!(lines.next().unwrap().starts_with("atta\tat + ta\t\tr1\t0\t1\t7"));
    }
}
