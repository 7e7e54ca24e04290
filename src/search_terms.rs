//! Search-term generation for catalogue lookups.
//!
//! One noisy local label becomes an ordered sequence of probe terms:
//! the raw label, its normalized form, kanji runs, then word windows.
//! Broad terms come first for recall; later terms are narrower anchors
//! that survive partial indexing on the remote side.

use crate::normalize::normalize;

/// Maximum number of probe terms generated per label.
pub const MAX_SEARCH_TERMS: usize = 5;

/// Build the ordered, deduplicated probe sequence for `raw`, truncated to
/// `max_terms`.  Order: raw label, normalized label, dense-script runs
/// (longest first), word windows (longest first).  First occurrence of a
/// duplicate wins.
///
/// When normalization strips the label to nothing (symbol-only titles),
/// the sequence collapses to a single term: the first 10 characters of the
/// trimmed raw label.  Empty input produces no terms at all.
pub fn search_terms(raw: &str, max_terms: usize) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut terms: Vec<String> = Vec::new();
    push_term(&mut terms, raw.to_string(), max_terms);

    let normalized = normalize(raw);
    if normalized.is_empty() {
        let probe: String = raw.trim().chars().take(10).collect();
        return vec![probe];
    }
    push_term(&mut terms, normalized.clone(), max_terms);

    for run in dense_script_runs(&normalized) {
        push_term(&mut terms, run, max_terms);
    }
    for window in word_windows(&normalized) {
        push_term(&mut terms, window, max_terms);
    }
    terms
}

fn push_term(terms: &mut Vec<String>, term: String, max_terms: usize) {
    if terms.len() < max_terms && !term.is_empty() && !terms.contains(&term) {
        terms.push(term);
    }
}

/// Maximal contiguous runs of CJK ideographs in `s`, longest first.
/// Equal lengths keep text order.  Kana is deliberately excluded: kanji
/// runs are the high-precision anchors in mixed-script labels.
pub fn dense_script_runs(s: &str) -> Vec<String> {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if is_dense_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    runs
}

/// Longest CJK ideograph run of `s`, if any.
pub fn longest_dense_run(s: &str) -> Option<String> {
    dense_script_runs(s).into_iter().next()
}

fn is_dense_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // CJK unified ideographs
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{F900}'..='\u{FAFF}')  // compatibility ideographs
}

/// All contiguous whitespace-token windows of `s`, longest first (by
/// character count, stable on ties).  The full window comes first and
/// usually dedups against the normalized label itself.
fn word_windows(s: &str) -> Vec<String> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let n = tokens.len();
    let mut windows: Vec<String> = Vec::new();
    for size in (1..=n).rev() {
        for start in 0..=(n - size) {
            windows.push(tokens[start..start + size].join(" "));
        }
    }
    windows.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    windows
}
