//! In-memory stand-ins for tag storage and MusicBrainz used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::musicbrainz::{CandidateRelease, MetadataService, MusicBrainzError};
use crate::scanner::metadata::{TagError, TagInfo, TagStore};

/// Tags keyed by path. Unknown paths read as untagged.
#[derive(Default)]
pub struct MemoryTags {
    files: RefCell<HashMap<PathBuf, TagInfo>>,
    failing_writes: RefCell<HashSet<PathBuf>>,
    writes: RefCell<Vec<(PathBuf, String)>>,
}

impl MemoryTags {
    pub fn add(&self, path: &Path, album: Option<&str>, artist: Option<&str>, title: Option<&str>) {
        self.files.borrow_mut().insert(
            path.to_path_buf(),
            TagInfo {
                title: title.map(String::from),
                artist: artist.map(String::from),
                album: album.map(String::from),
            },
        );
    }

    pub fn fail_writes_for(&self, path: &Path) {
        self.failing_writes.borrow_mut().insert(path.to_path_buf());
    }

    pub fn album(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).and_then(|t| t.album.clone())
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.borrow().clone()
    }
}

impl TagStore for MemoryTags {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, TagError> {
        Ok(self.files.borrow().get(path).cloned().unwrap_or_default())
    }

    fn write_album(&self, path: &Path, album: &str) -> Result<(), TagError> {
        if self.failing_writes.borrow().contains(path) {
            return Err(TagError::NoWritableTag {
                path: path.display().to_string(),
            });
        }
        self.files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .album = Some(album.to_string());
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), album.to_string()));
        Ok(())
    }
}

/// Scripted MusicBrainz with call counters.
#[derive(Default)]
pub struct StubService {
    pub releases: Vec<CandidateRelease>,
    pub tracks: HashMap<String, Vec<String>>,
    pub fail_search: bool,
    pub failing_tracks: HashSet<String>,
    /// Number of pings that fail before one succeeds.
    pub ping_failures: Cell<u32>,
    pub search_calls: Cell<u32>,
    pub track_calls: RefCell<Vec<String>>,
    pub ping_calls: Cell<u32>,
}

impl StubService {
    pub fn with_release(
        mut self,
        id: &str,
        title: &str,
        primary: Option<&str>,
        secondary: &[&str],
        tracks: &[&str],
    ) -> Self {
        self.releases.push(CandidateRelease {
            id: id.to_string(),
            title: title.to_string(),
            primary_type: primary.map(String::from),
            secondary_types: secondary.iter().map(|s| s.to_string()).collect(),
        });
        self.tracks
            .insert(id.to_string(), tracks.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn remote_calls(&self) -> usize {
        self.search_calls.get() as usize + self.track_calls.borrow().len()
    }
}

impl MetadataService for StubService {
    fn search_releases(
        &self,
        _album: &str,
        _artist: Option<&str>,
    ) -> Result<Vec<CandidateRelease>, MusicBrainzError> {
        self.search_calls.set(self.search_calls.get() + 1);
        if self.fail_search {
            return Err(MusicBrainzError::Unavailable("stub search failure".to_string()));
        }
        Ok(self.releases.clone())
    }

    fn release_tracks(&self, release_id: &str) -> Result<Vec<String>, MusicBrainzError> {
        self.track_calls.borrow_mut().push(release_id.to_string());
        if self.failing_tracks.contains(release_id) {
            return Err(MusicBrainzError::NotFound(format!("release {release_id}")));
        }
        Ok(self.tracks.get(release_id).cloned().unwrap_or_default())
    }

    fn ping(&self) -> Result<(), MusicBrainzError> {
        self.ping_calls.set(self.ping_calls.get() + 1);
        let remaining = self.ping_failures.get();
        if remaining > 0 {
            self.ping_failures.set(remaining - 1);
            return Err(MusicBrainzError::Unavailable("stub ping failure".to_string()));
        }
        Ok(())
    }
}
