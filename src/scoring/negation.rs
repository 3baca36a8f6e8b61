use std::collections::HashSet;

/// Inflected forms known to carry a negative/privative prefix
pub type NegativeSet = HashSet<String>;

/// Count the segments after the first that are known negative forms.
///
/// The head segment is never counted. A split without the separator has no
/// non-initial segments and counts 0.
pub fn negation_count(split: &str, separator: &str, negatives: &NegativeSet) -> usize {
    if negatives.is_empty() || !split.contains(separator) {
        return 0;
    }
    split
        .split(separator)
        .skip(1)
        .filter(|segment| negatives.contains(*segment))
        .count()
}
