pub mod catalogue;
pub mod config;
pub mod matcher;
pub mod normalize;
pub mod rate_limiter;
pub mod resolver;
pub mod search_terms;
pub mod similarity;
pub mod tagger;
pub mod tags;
pub mod utanet;

pub use catalogue::{CatalogueEntry, CatalogueError, CatalogueSource};
pub use config::Config;
pub use matcher::{find_best_match, CandidateMatch, DEFAULT_MATCH_THRESHOLD};
pub use normalize::normalize;
pub use resolver::{
    build_artist_context, resolve_artist, resolve_title, ArtistContext, ArtistMatch, MatchResult,
    ResolveError,
};
pub use search_terms::search_terms;
pub use similarity::similarity;
pub use tagger::{FileFailure, TagRun};
pub use tags::{read_local_tags, write_lyrics, ContainerFormat, LocalTags, TagError};
pub use utanet::UtaNetClient;
