use lofty::config::WriteOptions;
use lofty::error::LoftyError;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::tag::Tag;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("Could not read tags from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: LoftyError,
    },
    #[error("Could not write tags to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: LoftyError,
    },
    #[error("No writable tag in {path}")]
    NoWritableTag { path: String },
}

/// The tag fields the tagger cares about. Blank values are reported as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Read/write access to audio file tags.
pub trait TagStore {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, TagError>;

    /// Replace the album field and persist the file.
    fn write_album(&self, path: &Path, album: &str) -> Result<(), TagError>;
}

/// `TagStore` backed by lofty, operating on files in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagStore;

impl TagStore for LoftyTagStore {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, TagError> {
        let tagged_file = lofty::read_from_path(path).map_err(|source| TagError::Read {
            path: path.display().to_string(),
            source,
        })?;

        // Try primary tag, then fall back
        let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            Some(t) => t,
            None => {
                log::debug!("No tags in {}", path.display());
                return Ok(TagInfo::default());
            }
        };

        Ok(TagInfo {
            title: non_blank(tag.title().as_deref()),
            artist: non_blank(tag.artist().as_deref()),
            album: non_blank(tag.album().as_deref()),
        })
    }

    fn write_album(&self, path: &Path, album: &str) -> Result<(), TagError> {
        let mut tagged_file = lofty::read_from_path(path).map_err(|source| TagError::Read {
            path: path.display().to_string(),
            source,
        })?;

        // Write into the tag the fields were read from so album and artist stay together
        let tag_type = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            Some(tag) => tag.tag_type(),
            None => tagged_file.primary_tag_type(),
        };
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }

        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| TagError::NoWritableTag {
                path: path.display().to_string(),
            })?;
        tag.set_album(album.to_string());

        tagged_file
            .save_to_path(path, WriteOptions::default())
            .map_err(|source| TagError::Write {
                path: path.display().to_string(),
                source,
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(|s| s.to_string())
}
