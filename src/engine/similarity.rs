//! Ratcliff/Obershelp similarity, equivalent to difflib's `SequenceMatcher.ratio()`
//! without junk heuristics. Meanings are short, so autojunk never applies.

use std::collections::HashMap;

/// Similarity of two strings in `[0, 1]`. Identical strings are always 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches = matching_chars(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// True when `a` and `b` are too alike to appear in the same choice set.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    a == b || ratio(a, b) > threshold
}

/// Total size of all matching blocks, found by recursively splitting around
/// the longest common substring.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest block `a[i..i+k] == b[j..j+k]` within the given bounds. Ties go
/// to the earliest start in `a`, then the earliest in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // j2len[j + 1] = length of the match ending at a[i - 1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(ch) {
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
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        j2len = next;
    }
    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_are_one() {
        assert_eq!(ratio("a fruit", "a fruit"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_are_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn matches_difflib_reference_values() {
        // SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!(approx(ratio("abcd", "bcde"), 0.75));
        // "a fruit" is a prefix of "a fruit-like": 2*7/19
        assert!(approx(ratio("a fruit", "a fruit-like"), 14.0 / 19.0));
        // "a " + "i" match: 2*3/16
        assert!(approx(ratio("a fruit", "a vehicle"), 6.0 / 16.0));
    }

    #[test]
    fn ratio_is_symmetric_for_simple_cases() {
        assert!(approx(ratio("tiger", "tigress"), ratio("tigress", "tiger")));
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        // Two of three characters shared.
        assert!(approx(ratio("果物だ", "果物の"), 4.0 / 6.0));
    }

    #[test]
    fn is_similar_respects_threshold() {
        assert!(is_similar("a fruit", "a fruit-like", 0.4));
        assert!(!is_similar("a fruit", "a vehicle", 0.4));
        assert!(is_similar("same", "same", 1.0));
    }
}
