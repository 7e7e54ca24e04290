//! Local audio file tag access, backed by `lofty`.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use lofty::tag::{ItemKey, Tag, TagType};
use thiserror::Error;

/// File extensions the directory scan picks up.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "m4a", "ogg", "aac"];

#[derive(Debug, Error)]
pub enum TagError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read tags: {0}")]
    Read(String),
    #[error("failed to write tags: {0}")]
    Write(String),
}

/// Tag container family, decided by file extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Id3,
    Mp4,
    Vorbis,
}

impl ContainerFormat {
    pub fn from_path(path: &Path) -> Result<Self, TagError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp3" | "aac" => Ok(ContainerFormat::Id3),
            "m4a" => Ok(ContainerFormat::Mp4),
            "flac" | "ogg" => Ok(ContainerFormat::Vorbis),
            _ => Err(TagError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Tag type written for this container.
    pub fn tag_type(self) -> TagType {
        match self {
            ContainerFormat::Id3 => TagType::Id3v2,
            ContainerFormat::Mp4 => TagType::Mp4Ilst,
            ContainerFormat::Vorbis => TagType::VorbisComments,
        }
    }
}

/// Title and artist as stored in a file's tags.  Missing values are
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalTags {
    pub title: String,
    pub artist: String,
}

/// True for paths the directory scan should consider.
pub fn is_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .map_or(false, |e| AUDIO_EXTENSIONS.contains(&e.as_str()))
}

fn first_non_empty<F>(primary: Option<&Tag>, tags: &[Tag], mut extract: F) -> String
where
    F: FnMut(&Tag) -> Option<String>,
{
    primary
        .iter()
        .copied()
        .chain(tags.iter())
        .filter_map(|tag| extract(tag))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Read title and artist from an audio file, preferring the primary tag
/// but falling back to any other tag the file carries.
pub fn read_local_tags(path: &Path) -> Result<LocalTags, TagError> {
    ContainerFormat::from_path(path)?;
    let tagged = read_from_path(path).map_err(|e| TagError::Read(e.to_string()))?;
    let primary = tagged.primary_tag();
    let tags = tagged.tags();
    let title = first_non_empty(primary, tags, |tag| {
        tag.title().map(|value| value.into_owned())
    });
    let artist = first_non_empty(primary, tags, |tag| {
        tag.artist()
            .map(|value| value.into_owned())
            .or_else(|| tag.get_string(ItemKey::AlbumArtist).map(str::to_string))
    });
    Ok(LocalTags { title, artist })
}

/// Write the lyric text into the file's native tag, creating the tag
/// when the file has none.  Existing lyrics are replaced.
pub fn write_lyrics(path: &Path, lyrics: &str) -> Result<(), TagError> {
    let format = ContainerFormat::from_path(path)?;
    let mut tagged = read_from_path(path).map_err(|e| TagError::Read(e.to_string()))?;
    let tag_type = format.tag_type();
    if tagged.tag(tag_type).is_none() {
        tagged.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged
        .tag_mut(tag_type)
        .ok_or_else(|| TagError::Write(format!("no writable tag for {}", path.display())))?;
    tag.insert_text(ItemKey::Lyrics, lyrics.to_string());
    tagged
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| TagError::Write(e.to_string()))
}
