//! Search uta-net.com for an artist and print the resolved match.
//!
//! Runs the same probe-term walk the tagger uses when it auto-detects an
//! artist, which makes it handy for checking why a tag does or does not
//! resolve.
//!
//! Usage:
//!   artist_search <ARTIST> [--songs] [--verbose]

use std::process;

use utatag::catalogue::CatalogueSource;
use utatag::resolver::{self, ResolveError};
use utatag::search_terms::{search_terms, MAX_SEARCH_TERMS};
use utatag::UtaNetClient;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let list_songs = args.iter().any(|a| a == "--songs");

    let artist = match args.iter().skip(1).find(|a| !a.starts_with('-')) {
        Some(a) => a.clone(),
        None => {
            eprintln!("Usage: artist_search <ARTIST> [--songs] [--verbose]");
            process::exit(1);
        }
    };

    if verbose {
        let terms = search_terms(&artist, MAX_SEARCH_TERMS);
        println!("Probe terms for {:?}:", artist);
        for (i, term) in terms.iter().enumerate() {
            println!("  {}. {:?}", i + 1, term);
        }
        println!();
    }

    let mut client = UtaNetClient::new();
    let matched = match resolver::resolve_artist(&mut client, &artist, verbose) {
        Ok(m) => m,
        Err(e) => {
            match &e {
                ResolveError::NoCandidates => {
                    eprintln!("No results found for artist: {}", artist)
                }
                _ => eprintln!("Error: {}", e),
            }
            process::exit(1);
        }
    };

    println!();
    println!("Artist:     {}", matched.name);
    println!("URL:        {}", matched.url);
    if !matched.song_count.is_empty() {
        println!("Songs:      {}", matched.song_count);
    }
    println!("Similarity: {:.2}", matched.confidence);

    if list_songs {
        println!();
        match client.song_entries(&matched.url) {
            Ok(songs) => {
                println!("=== Song Listing ({}) ===", songs.len());
                for (title, url) in &songs {
                    println!("  {}  ({})", title, url);
                }
            }
            Err(e) => {
                eprintln!("Failed to fetch song listing: {}", e);
                process::exit(1);
            }
        }
    }
}
