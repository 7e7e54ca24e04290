//! Best-candidate selection over a set of catalogue labels.
//!
//! Two mechanisms run in a single pass: a similarity threshold for
//! near-identical strings, and a longest-substring fallback for the common
//! case where the local title carries a decoration the catalogue entry
//! lacks ("夜に駆ける (Live Ver.)" vs "夜に駆ける").

use crate::similarity::similarity;

/// Default threshold for title matching.  Artist matching passes a looser
/// value explicitly.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;

/// A selected candidate: index into the candidate slice plus the
/// similarity score it was accepted with.  For a substring fallback the
/// score is the real similarity and may sit below the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    pub index: usize,
    pub score: f64,
}

/// Pick the best candidate for `query`.
///
/// Returns the highest-scoring candidate at or above `threshold` (ties keep
/// the first seen).  When no candidate clears the threshold, falls back to
/// the longest non-empty candidate that is a literal substring of `query`,
/// scored by its recomputed similarity.  Empty candidate list gives `None`.
pub fn find_best_match(query: &str, candidates: &[&str], threshold: f64) -> Option<CandidateMatch> {
    let mut best: Option<CandidateMatch> = None;
    let mut substring: Option<(usize, usize)> = None; // (index, char length)

    for (index, candidate) in candidates.iter().enumerate() {
        let score = similarity(query, candidate);
        if score >= threshold && best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(CandidateMatch { index, score });
        }

        if !candidate.is_empty() && query.contains(candidate) {
            let len = candidate.chars().count();
            if substring.map_or(true, |(_, best_len)| len > best_len) {
                substring = Some((index, len));
            }
        }
    }

    if best.is_some() {
        return best;
    }
    substring.map(|(index, _)| CandidateMatch {
        index,
        score: similarity(query, candidates[index]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_candidates() {
        assert_eq!(find_best_match("anything", &[], 0.8), None);
    }

    #[test]
    fn test_exact_match() {
        let m = find_best_match("lemon", &["orange", "lemon"], 0.8).unwrap();
        assert_eq!(m.index, 1);
        assert!((m.score - 1.0).abs() < EPS);
    }

    #[test]
    fn test_below_threshold_without_substring_is_none() {
        // similar-ish but under 0.8, and not contained in the query
        assert_eq!(find_best_match("lemon", &["melons"], 0.8), None);
    }

    #[test]
    fn test_tie_keeps_first() {
        let m = find_best_match("lemon", &["lemon", "lemon"], 0.8).unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_substring_fallback_on_decorated_title() {
        // only the bare title is contained in the decorated query; it wins
        // even though its similarity is far below the threshold
        let query = "夜に駆ける (Live Ver.)";
        let candidates = ["夜に駆ける", "夜に駆ける (Acoustic)"];
        let m = find_best_match(query, &candidates, 0.8).unwrap();
        assert_eq!(m.index, 0);
        assert!(m.score < 0.8);
        assert!((m.score - similarity(query, candidates[0])).abs() < EPS);
    }

    #[test]
    fn test_substring_fallback_prefers_longest() {
        let m = find_best_match("abcdefgh", &["abc", "abcdef"], 0.99).unwrap();
        assert_eq!(m.index, 1);
    }

    #[test]
    fn test_substring_equal_length_tie_keeps_first() {
        // both are 4-char substrings of the query; the first seen stays
        let m = find_best_match("abcdefgh", &["abcd", "efgh"], 0.99).unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_thresholded_match_beats_longer_substring() {
        // second candidate clears the threshold, so the substring track
        // never comes into play
        let m = find_best_match("abcdefgh", &["abcdef", "abcdefgh!"], 0.8).unwrap();
        assert_eq!(m.index, 1);
        assert!(m.score >= 0.8);
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        assert_eq!(find_best_match("abc", &[""], 0.8), None);
    }

    #[test]
    fn test_low_confidence_implies_substring() {
        // any returned score under the threshold must come from the
        // substring track
        let cases: [(&str, &[&str]); 2] = [
            ("the quick brown fox", &["fox", "wolf"]),
            ("夜に駆ける (Live Ver.)", &["夜に駆ける"]),
        ];
        for (query, candidates) in cases {
            if let Some(m) = find_best_match(query, candidates, 0.8) {
                if m.score < 0.8 {
                    assert!(query.contains(candidates[m.index]));
                }
            }
        }
    }
}
