use std::collections::HashMap;

use crate::scoring::SimilarityScorer;

/// Ratcliff/Obershelp "gestalt" ratio: `2 * M / (|a| + |b|)` where M is the
/// total size of the matching blocks found by repeatedly taking the longest
/// common substring and recursing on both sides of it.
///
/// Works on chars, not bytes. No junk heuristic is applied.
pub struct MatchingBlocksScorer;

impl MatchingBlocksScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MatchingBlocksScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityScorer for MatchingBlocksScorer {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }

        let matched = matching_total(&a, &b);
        2.0 * matched as f64 / total as f64
    }

    fn name(&self) -> &str {
        "matching_blocks"
    }
}

/// Sum of matching block sizes
fn matching_total(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the given windows.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // j -> length of the match ending at (i - 1, j)
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(a: &str, b: &str) -> f64 {
        MatchingBlocksScorer::new().ratio(a, b)
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(ratio("atta", "atta"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("atta", ""), 0.0);
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_values() {
        // blocks "ab" + "d": 2*3 / 8
        assert!((ratio("abcd", "abxd") - 0.75).abs() < 1e-12);
        // single block "bc": 2*2 / 8
        assert!((ratio("abcd", "bcxx") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_on_sample() {
        let pairs = [
            ("dhammacakka", "dhamma + cakka"),
            ("cattāro", "catuāro"),
            ("yathābhūtaṃ", "yathā + bhūtaṃ"),
        ];
        for (a, b) in pairs {
            assert!((ratio(a, b) - ratio(b, a)).abs() < 1e-12, "{} / {}", a, b);
        }
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a: Vec<char> = "abab".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        assert_eq!(longest_match(&a, &b2j, 0, 4, 0, 2), (0, 0, 2));
    }

    #[test]
    fn test_ratio_bounds() {
        let r = ratio("sabbe + satta", "sabbesatta");
        assert!(r > 0.0 && r < 1.0);
    }
}
