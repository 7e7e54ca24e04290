//! Sequence similarity scoring.
//!
//! Implements the matching-blocks ratio: find the longest common block,
//! recurse on the pieces to its left and right, and score
//! `2 * matched / (len(a) + len(b))`.  Edit-distance metrics punish
//! reordering too hard for catalogue titles, where the common case is a
//! shared core plus decorations on either side.

/// Similarity of two strings in [0, 1].
///
/// 1.0 for identical strings (including two empty strings), 0.0 when the
/// strings share nothing.  Symmetric in its arguments.  Operates on
/// characters, not bytes, so multibyte text scores by content length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_len(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total length of the non-overlapping, order-preserving matched blocks.
fn matching_len(a: &[char], b: &[char]) -> usize {
    let (ai, bi, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_len(&a[..ai], &b[..bi]) + matching_len(&a[ai + size..], &b[bi + size..])
}

/// Longest common contiguous block of `a` and `b` as (start in a,
/// start in b, length).  Ties resolve to the earliest position in `a`,
/// then the earliest in `b`, so repeated inputs always pick the same
/// blocks.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // row[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut row = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut prev = 0;
        for j in 0..b.len() {
            let diag = prev;
            prev = row[j + 1];
            row[j + 1] = if a[i] == b[j] { diag + 1 } else { 0 };
            if row[j + 1] > best.2 {
                best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_reflexive() {
        assert!((similarity("abc", "abc") - 1.0).abs() < EPS);
        assert!((similarity("夜に駆ける", "夜に駆ける") - 1.0).abs() < EPS);
        assert!((similarity("", "") - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_vs_nonempty() {
        assert!((similarity("", "x") - 0.0).abs() < EPS);
        assert!((similarity("x", "") - 0.0).abs() < EPS);
    }

    #[test]
    fn test_symmetric_score() {
        let pairs = [("night", "nacht"), ("abcd", "bcde"), ("米津玄師", "米津")];
        for (x, y) in pairs {
            assert!((similarity(x, y) - similarity(y, x)).abs() < EPS);
        }
    }

    #[test]
    fn test_known_ratios() {
        // blocks: "bcd" → 2*3 / 8
        assert!((similarity("abcd", "bcde") - 0.75).abs() < EPS);
        // one transposition only recovers a single character
        assert!((similarity("ab", "ba") - 0.5).abs() < EPS);
        // no common characters at all
        assert!((similarity("abc", "xyz") - 0.0).abs() < EPS);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 5 shared chars out of 5 + 16
        let score = similarity("夜に駆ける", "夜に駆ける (acoustic)");
        assert!((score - 10.0 / 21.0).abs() < EPS);
    }

    #[test]
    fn test_recurses_around_longest_block() {
        let score = similarity("abc x ijklm", "abc yyy ijklm...");
        let a_len = "abc x ijklm".chars().count();
        let b_len = "abc yyy ijklm...".chars().count();
        // longest block " ijklm" (6), then "abc " (4) on the left piece
        let expected = 2.0 * (6.0 + 4.0) / (a_len + b_len) as f64;
        assert!((score - expected).abs() < EPS);
    }
}
