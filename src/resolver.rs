//! Two-stage resolution against the remote catalogue.
//!
//! Stage one resolves a raw artist label to an artist page and pulls the
//! full song listing.  Stage two is the per-file fallback: search songs
//! directly by title, scoring each hit on weighted title and artist
//! similarity.  Both stages walk the probe sequence from
//! [`crate::search_terms`] and stop at the first confident result rather
//! than searching exhaustively.

use std::ops::ControlFlow;

use thiserror::Error;

use crate::catalogue::{CatalogueEntry, CatalogueError, CatalogueSource};
use crate::matcher::{find_best_match, DEFAULT_MATCH_THRESHOLD};
use crate::normalize::normalize;
use crate::search_terms::{longest_dense_run, search_terms, MAX_SEARCH_TERMS};
use crate::similarity::similarity;

/// Acceptance threshold for artist-name matching.  Loose on purpose:
/// artist tags vary by ordering, honorifics and romanization far more
/// than titles do.
pub const ARTIST_MATCH_THRESHOLD: f64 = 0.3;

/// Combined-score gate for the title fallback.  Once the best candidate
/// so far reaches this, no further probe terms are issued.
pub const COMBINED_STOP_THRESHOLD: f64 = 0.3;

/// Weights for the combined title-fallback score.  Artist similarity
/// dominates because unrelated songs share titles far more often than
/// unrelated artists share names.
pub const TITLE_WEIGHT: f64 = 0.3;
pub const ARTIST_WEIGHT: f64 = 0.7;

/// Why a resolution produced no usable match.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no candidates found")]
    NoCandidates,
    #[error("best candidate scored {best:.2}, below the acceptance threshold")]
    BelowThreshold { best: f64 },
    #[error("catalogue request failed: {0}")]
    Transport(#[from] CatalogueError),
}

/// A resolved song: the catalogue's own title, its page URL and the score
/// the match was accepted with.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub label: String,
    pub url: String,
    pub confidence: f64,
}

/// A resolved artist entry from the catalogue search.
#[derive(Debug, Clone)]
pub struct ArtistMatch {
    pub name: String,
    pub url: String,
    pub song_count: String,
    pub confidence: f64,
}

/// Immutable snapshot of one resolved artist and their song listing.
/// Built once per directory (or per file in per-file-search mode) and
/// passed by reference; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct ArtistContext {
    pub artist_name: String,
    pub artist_url: String,
    pub songs: Vec<(String, String)>,
}

/// Short-circuiting fold over the probe-term sequence: run `probe` on
/// each term in order, stop at the first `Break`.  Keeping the walk in
/// one place lets a different stopping policy swap in without touching
/// term generation.
fn fold_terms<T>(
    terms: &[String],
    mut probe: impl FnMut(usize, &str) -> ControlFlow<T>,
) -> Option<T> {
    for (i, term) in terms.iter().enumerate() {
        if let ControlFlow::Break(v) = probe(i, term) {
            return Some(v);
        }
    }
    None
}

/// Resolve a raw artist label to a catalogue artist.
///
/// Walks the probe terms in order and accepts the first term whose best
/// candidate clears [`ARTIST_MATCH_THRESHOLD`]; later terms are never
/// issued after that.  A substring-fallback match below the threshold is
/// kept as a provisional answer and returned only if no term produces a
/// confident one.  Transport errors on a term are treated as "no entries"
/// and the next term is tried.
pub fn resolve_artist(
    source: &mut dyn CatalogueSource,
    raw_artist: &str,
    verbose: bool,
) -> Result<ArtistMatch, ResolveError> {
    let terms = search_terms(raw_artist, MAX_SEARCH_TERMS);
    let mut provisional: Option<ArtistMatch> = None;
    let mut best_seen: f64 = 0.0;
    let mut saw_entries = false;

    let confident = fold_terms(&terms, |_, term| {
        if verbose {
            println!("  [{}] artist search: {:?}", source.name(), term);
        }
        let entries = match source.search_artists(term) {
            Ok(entries) => entries,
            Err(e) => {
                if verbose {
                    println!("  [{}] artist search failed: {}", source.name(), e);
                }
                return ControlFlow::Continue(());
            }
        };
        if entries.is_empty() {
            return ControlFlow::Continue(());
        }
        saw_entries = true;

        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        let m = match find_best_match(raw_artist, &labels, ARTIST_MATCH_THRESHOLD) {
            Some(m) => m,
            None => {
                best_seen = best_seen.max(top_similarity(raw_artist, &labels));
                return ControlFlow::Continue(());
            }
        };
        let entry = &entries[m.index];
        let matched = ArtistMatch {
            name: entry.label.clone(),
            url: entry.url.clone(),
            song_count: entry.extra.clone(),
            confidence: m.score,
        };
        if m.score >= ARTIST_MATCH_THRESHOLD {
            ControlFlow::Break(matched)
        } else {
            // substring fallback under the threshold: keep the first one
            // in reserve but keep probing
            best_seen = best_seen.max(m.score);
            if provisional.is_none() {
                provisional = Some(matched);
            }
            ControlFlow::Continue(())
        }
    });

    let resolved = confident.or(provisional);
    match resolved {
        Some(m) => {
            println!("Best artist match (similarity: {:.2}): {}", m.confidence, m.name);
            Ok(m)
        }
        None if saw_entries => Err(ResolveError::BelowThreshold { best: best_seen }),
        None => Err(ResolveError::NoCandidates),
    }
}

fn top_similarity(query: &str, labels: &[&str]) -> f64 {
    labels
        .iter()
        .map(|label| similarity(query, label))
        .fold(0.0, f64::max)
}

/// Per-file title fallback: search songs by title terms, score every hit
/// on weighted title/artist similarity, stop once the best combined score
/// reaches [`COMBINED_STOP_THRESHOLD`].
///
/// A transport error on any later term just skips to the next term.  An
/// error on the *first* term aborts the walk: the broadest probe being
/// unsearchable means the narrower variants derived from it will be too,
/// so the only thing left to try is the longest kanji run of the title,
/// once, before giving up.
pub fn resolve_title(
    source: &mut dyn CatalogueSource,
    raw_title: &str,
    raw_artist: &str,
    verbose: bool,
) -> Result<MatchResult, ResolveError> {
    let norm_title = normalize(raw_title);
    let norm_artist = normalize(raw_artist);
    let terms = search_terms(raw_title, MAX_SEARCH_TERMS);

    let mut best: Option<MatchResult> = None;

    fold_terms(&terms, |i, term| {
        if verbose {
            println!("  [{}] song search: {:?}", source.name(), term);
        }
        match source.search_songs(term) {
            Ok(entries) => {
                score_song_entries(&entries, &norm_title, &norm_artist, &mut best);
            }
            Err(e) if i == 0 => {
                if verbose {
                    println!("  [{}] song search failed: {}", source.name(), e);
                }
                if let Some(run) = longest_dense_run(&norm_title) {
                    if verbose {
                        println!("  [{}] retrying with kanji run {:?}", source.name(), run);
                    }
                    if let Ok(entries) = source.search_songs(&run) {
                        score_song_entries(&entries, &norm_title, &norm_artist, &mut best);
                    }
                }
                return ControlFlow::Break(());
            }
            Err(e) => {
                if verbose {
                    println!("  [{}] song search failed: {}", source.name(), e);
                }
            }
        }
        match &best {
            Some(b) if b.confidence >= COMBINED_STOP_THRESHOLD => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    });

    match best {
        Some(m) if m.confidence >= COMBINED_STOP_THRESHOLD => Ok(m),
        Some(m) => Err(ResolveError::BelowThreshold { best: m.confidence }),
        None => Err(ResolveError::NoCandidates),
    }
}

fn score_song_entries(
    entries: &[CatalogueEntry],
    norm_title: &str,
    norm_artist: &str,
    best: &mut Option<MatchResult>,
) {
    for entry in entries {
        let combined = TITLE_WEIGHT * similarity(norm_title, &normalize(&entry.label))
            + ARTIST_WEIGHT * similarity(norm_artist, &normalize(&entry.extra));
        if best.as_ref().map_or(true, |b| combined > b.confidence) {
            *best = Some(MatchResult {
                label: entry.label.clone(),
                url: entry.url.clone(),
                confidence: combined,
            });
        }
    }
}

/// Match a local title against an artist's collected song listing.
/// Both sides are normalized for the comparison; the result carries the
/// catalogue's original title and URL.
pub fn match_catalogue_title(raw_title: &str, songs: &[(String, String)]) -> Option<MatchResult> {
    let query = normalize(raw_title);
    let cleaned: Vec<String> = songs.iter().map(|(title, _)| normalize(title)).collect();
    let labels: Vec<&str> = cleaned.iter().map(String::as_str).collect();
    let m = find_best_match(&query, &labels, DEFAULT_MATCH_THRESHOLD)?;
    let (title, url) = &songs[m.index];
    Some(MatchResult {
        label: title.clone(),
        url: url.clone(),
        confidence: m.score,
    })
}

/// Resolve an artist and pull their full song listing in one step.
pub fn build_artist_context(
    source: &mut dyn CatalogueSource,
    raw_artist: &str,
    verbose: bool,
) -> Result<ArtistContext, ResolveError> {
    let artist = resolve_artist(source, raw_artist, verbose)?;
    println!("Found artist: {} ({})", artist.name, artist.song_count);
    let songs = source.song_entries(&artist.url)?;
    Ok(ArtistContext {
        artist_name: artist.name,
        artist_url: artist.url,
        songs,
    })
}

/// Build a context straight from a known artist page URL, skipping the
/// search.  Used when the caller supplies the URL explicitly.
pub fn context_from_url(
    source: &mut dyn CatalogueSource,
    artist_url: &str,
) -> Result<ArtistContext, ResolveError> {
    let songs = source.song_entries(artist_url)?;
    Ok(ArtistContext {
        artist_name: String::new(),
        artist_url: artist_url.to_string(),
        songs,
    })
}
