//! Fetch and print the lyrics for a single song.
//!
//! Takes either a uta-net song page URL directly, or an artist and title
//! to resolve first.
//!
//! Usage:
//!   lyrics_fetch <SONG_URL>
//!   lyrics_fetch <ARTIST> <TITLE> [--verbose]

use std::process;

use utatag::catalogue::CatalogueSource;
use utatag::resolver;
use utatag::UtaNetClient;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let positional: Vec<String> = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .collect();

    let mut client = UtaNetClient::new();

    let song_url = match positional.as_slice() {
        [url] if url.starts_with("http") => url.clone(),
        [artist, title] => {
            let context = match resolver::build_artist_context(&mut client, artist, verbose) {
                Ok(ctx) => ctx,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            let matched = resolver::match_catalogue_title(title, &context.songs)
                .or_else(|| resolver::resolve_title(&mut client, title, artist, verbose).ok());
            match matched {
                Some(m) => {
                    println!("Matched '{}' to '{}' (score: {:.2})", title, m.label, m.confidence);
                    m.url
                }
                None => {
                    eprintln!("No matching song found for '{}'.", title);
                    process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Usage: lyrics_fetch <SONG_URL>");
            eprintln!("       lyrics_fetch <ARTIST> <TITLE> [--verbose]");
            process::exit(1);
        }
    };

    match client.lyrics(&song_url) {
        Ok(lyrics) if !lyrics.is_empty() => println!("{}", lyrics),
        Ok(_) => {
            eprintln!("No lyrics found at {}", song_url);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
