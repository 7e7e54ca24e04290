//! Batch driver: scan a directory, resolve each audio file against the
//! catalogue and write the lyrics it finds into the file's tags.
//!
//! The default mode resolves the artist once for the whole directory and
//! matches every file against that artist's song listing.  Per-file mode
//! repeats the artist resolution for each file instead, for directories
//! that mix artists.

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalogue::CatalogueSource;
use crate::resolver::{
    build_artist_context, context_from_url, match_catalogue_title, resolve_title, ArtistContext,
};
use crate::tags::{is_audio_path, read_local_tags, write_lyrics};
use crate::utanet;

/// Options for one tagging run.
#[derive(Debug, Clone, Default)]
pub struct TagRun {
    pub directory: PathBuf,
    pub artist_url: Option<String>,
    pub per_file_search: bool,
    pub verbose: bool,
}

/// One file the run could not complete, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub filename: String,
    pub reason: String,
}

/// Collect the audio files in a directory, sorted by name.  Non-audio
/// entries and subdirectories are ignored.
pub fn scan_audio_files(directory: &Path) -> Result<Vec<PathBuf>, io::Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_audio_path(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Run the tagger over a directory.  Returns the per-file failure
/// records; an error means the run could not start at all.
pub fn run(
    source: &mut dyn CatalogueSource,
    opts: &TagRun,
) -> Result<Vec<FileFailure>, Box<dyn Error>> {
    if !opts.directory.is_dir() {
        return Err(format!("{} is not a valid directory", opts.directory.display()).into());
    }
    let files = scan_audio_files(&opts.directory)?;
    if files.is_empty() {
        return Err("no audio files found in directory".into());
    }

    // Bulk mode resolves the artist once up front.  Per-file mode starts
    // from an empty context and rebuilds it for every file below.
    let mut context = if opts.per_file_search {
        ArtistContext {
            artist_name: String::new(),
            artist_url: String::new(),
            songs: Vec::new(),
        }
    } else {
        build_context(source, &files, opts)?
    };

    let mut failures: Vec<FileFailure> = Vec::new();
    for path in &files {
        let filename = display_name(path);

        let local = match read_local_tags(path) {
            Ok(local) => local,
            Err(e) => {
                println!("Could not open {}. Skipping.", filename);
                if opts.verbose {
                    println!("  {}", e);
                }
                failures.push(FileFailure {
                    filename,
                    reason: "Could not open file".to_string(),
                });
                continue;
            }
        };

        if opts.per_file_search {
            if local.artist.is_empty() {
                println!("No artist found for {}. Skipping.", filename);
                failures.push(FileFailure {
                    filename,
                    reason: "No artist found".to_string(),
                });
                continue;
            }
            println!("\nProcessing {} - Artist: {}", filename, local.artist);
            context = match build_artist_context(source, &local.artist, opts.verbose) {
                Ok(ctx) => ctx,
                Err(e) => {
                    println!("No artist found for {}. Skipping.", local.artist);
                    if opts.verbose {
                        println!("  {}", e);
                    }
                    failures.push(FileFailure {
                        filename,
                        reason: format!("No artist found for {}", local.artist),
                    });
                    continue;
                }
            };
        }

        if local.title.is_empty() {
            println!("No title found for {}. Skipping.", filename);
            failures.push(FileFailure {
                filename,
                reason: "No title found".to_string(),
            });
            continue;
        }

        let matched = match match_catalogue_title(&local.title, &context.songs) {
            Some(m) => {
                println!(
                    "Matched '{}' to '{}' (similarity: {:.2})",
                    local.title, m.label, m.confidence
                );
                m
            }
            // The artist listing missed it; try the site-wide song search
            // before giving up.
            None => {
                let artist_hint = if local.artist.is_empty() {
                    context.artist_name.as_str()
                } else {
                    local.artist.as_str()
                };
                match resolve_title(source, &local.title, artist_hint, opts.verbose) {
                    Ok(m) => {
                        println!(
                            "Matched '{}' to '{}' via song search (score: {:.2})",
                            local.title, m.label, m.confidence
                        );
                        m
                    }
                    Err(e) => {
                        println!("No matching song found for '{}'.", local.title);
                        if opts.verbose {
                            println!("  {}", e);
                        }
                        failures.push(FileFailure {
                            filename,
                            reason: format!("No matching song found for '{}'", local.title),
                        });
                        continue;
                    }
                }
            }
        };

        let lyrics = match source.lyrics(&matched.url) {
            Ok(text) => text,
            Err(e) => {
                println!("No lyrics found for '{}'.", matched.label);
                if opts.verbose {
                    println!("  {}", e);
                }
                failures.push(FileFailure {
                    filename,
                    reason: format!("No lyrics found for '{}'", matched.label),
                });
                continue;
            }
        };
        if lyrics.is_empty() {
            println!("No lyrics found for '{}'.", matched.label);
            failures.push(FileFailure {
                filename,
                reason: format!("No lyrics found for '{}'", matched.label),
            });
            continue;
        }

        println!("Writing lyrics to '{}'", filename);
        println!("{}", "-".repeat(20));
        println!("{}", lyrics);
        println!("{}", "-".repeat(20));

        match write_lyrics(path, &lyrics) {
            Ok(()) => println!("Lyrics added to {}", filename),
            Err(e) => {
                println!("Error adding lyrics to {}: {}", filename, e);
                failures.push(FileFailure {
                    filename,
                    reason: format!("Error writing lyrics: {}", e),
                });
            }
        }
    }

    print_summary(&failures, files.len());
    Ok(failures)
}

/// Resolve the run's artist context: from the explicit URL when one is
/// given and well-formed, otherwise by searching for the first file's
/// artist tag.
fn build_context(
    source: &mut dyn CatalogueSource,
    files: &[PathBuf],
    opts: &TagRun,
) -> Result<ArtistContext, Box<dyn Error>> {
    let context = match &opts.artist_url {
        Some(url) if utanet::is_artist_url(url) => context_from_url(source, url)?,
        _ => {
            if let Some(url) = &opts.artist_url {
                println!("Ignoring malformed artist URL: {}", url);
            }
            let first = &files[0];
            let local = read_local_tags(first)
                .map_err(|e| format!("could not read artist from {}: {}", display_name(first), e))?;
            if local.artist.is_empty() {
                return Err(format!("could not read artist from {}", display_name(first)).into());
            }
            println!("Detected artist: {}", local.artist);
            let context = build_artist_context(source, &local.artist, opts.verbose)?;
            println!("Artist URL: {}", context.artist_url);
            context
        }
    };
    if context.songs.is_empty() {
        return Err("no songs found for the given artist".into());
    }
    Ok(context)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the end-of-run summary.
fn print_summary(failures: &[FileFailure], total: usize) {
    if failures.is_empty() {
        println!("\nAll {} files processed successfully!", total);
        return;
    }
    println!("\nSummary of files that failed:");
    println!("{}", "-".repeat(50));
    for failure in failures {
        println!("• {}: {}", failure.filename, failure.reason);
    }
    println!("\nTotal: {} file(s) failed out of {}", failures.len(), total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{CatalogueEntry, CatalogueError};

    /// Stub catalogue with one fixed listing.
    struct ListingSource {
        songs: Vec<(String, String)>,
    }

    impl CatalogueSource for ListingSource {
        fn name(&self) -> &str {
            "stub"
        }

        fn search_artists(&mut self, _term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError> {
            Ok(Vec::new())
        }

        fn search_songs(&mut self, _term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError> {
            Ok(Vec::new())
        }

        fn song_entries(
            &mut self,
            _artist_url: &str,
        ) -> Result<Vec<(String, String)>, CatalogueError> {
            Ok(self.songs.clone())
        }

        fn lyrics(&mut self, _song_url: &str) -> Result<String, CatalogueError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_scan_audio_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp3", "a.flac", "cover.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.mp3")).unwrap();

        let files = scan_audio_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.flac", "b.mp3"]);
    }

    #[test]
    fn test_run_rejects_missing_directory() {
        let mut source = ListingSource { songs: Vec::new() };
        let opts = TagRun {
            directory: PathBuf::from("/no/such/dir"),
            ..TagRun::default()
        };
        assert!(run(&mut source, &opts).is_err());
    }

    #[test]
    fn test_run_rejects_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ListingSource { songs: Vec::new() };
        let opts = TagRun {
            directory: dir.path().to_path_buf(),
            ..TagRun::default()
        };
        assert!(run(&mut source, &opts).is_err());
    }

    #[test]
    fn test_run_records_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.mp3"), b"not audio").unwrap();
        std::fs::write(dir.path().join("two.mp3"), b"also not audio").unwrap();

        let mut source = ListingSource {
            songs: vec![("群青".to_string(), "https://x/song/1/".to_string())],
        };
        let opts = TagRun {
            directory: dir.path().to_path_buf(),
            artist_url: Some("https://www.uta-net.com/artist/12795/".to_string()),
            ..TagRun::default()
        };

        let failures = run(&mut source, &opts).unwrap();
        assert_eq!(failures.len(), 2);
        assert!(failures
            .iter()
            .all(|f| f.reason == "Could not open file"));
        assert_eq!(failures[0].filename, "one.mp3");
    }

    #[test]
    fn test_run_per_file_mode_records_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("solo.flac"), b"junk").unwrap();

        let mut source = ListingSource { songs: Vec::new() };
        let opts = TagRun {
            directory: dir.path().to_path_buf(),
            per_file_search: true,
            ..TagRun::default()
        };

        let failures = run(&mut source, &opts).unwrap();
        assert_eq!(
            failures,
            vec![FileFailure {
                filename: "solo.flac".to_string(),
                reason: "Could not open file".to_string(),
            }]
        );
    }
}
