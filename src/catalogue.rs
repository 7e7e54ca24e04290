//! Remote catalogue boundary.
//!
//! Everything the resolver knows about the outside world goes through
//! [`CatalogueSource`].  The production implementation talks to
//! uta-net.com; tests drive the resolver with scripted sources.

use thiserror::Error;

/// One row from a catalogue search.
///
/// For an artist search `label` is the artist name and `extra` the song
/// count; for a song search `label` is the title and `extra` the artist
/// column.  `url` is the absolute page URL and works as the entry's
/// identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    pub label: String,
    pub url: String,
    pub extra: String,
}

/// Failures crossing the catalogue boundary.  `NotFound` is split out from
/// the other statuses because the resolver treats a 404 on a probe term
/// differently from a dead connection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogueError {
    #[error("not found (404)")]
    NotFound,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Blocking catalogue operations consumed by the resolver and the batch
/// driver.  `&mut self` because implementations keep per-run state (rate
/// limiter pacing, recorded queries in tests).
pub trait CatalogueSource {
    /// Short name for progress messages.
    fn name(&self) -> &str;

    /// Search artists by name term.
    fn search_artists(&mut self, term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError>;

    /// Search songs by title term.  `extra` carries the result's artist.
    fn search_songs(&mut self, term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError>;

    /// Full (title, song URL) listing for an artist page, in page order.
    /// A title repeated across pages keeps its first position with the
    /// last URL seen.
    fn song_entries(&mut self, artist_url: &str)
        -> Result<Vec<(String, String)>, CatalogueError>;

    /// Lyrics text for a song page.  Empty string means the page has no
    /// lyrics, which is not an error.
    fn lyrics(&mut self, song_url: &str) -> Result<String, CatalogueError>;
}
