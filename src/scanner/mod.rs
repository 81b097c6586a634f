pub mod metadata;

use indicatif::{ProgressBar, ProgressStyle};
use metadata::TagStore;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root {0} does not exist or is not a directory")]
    InvalidRoot(String),
}

/// Identity of an album within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumKey {
    pub album: String,
    pub artist: String,
}

impl fmt::Display for AlbumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" by {}", self.album, self.artist)
    }
}

/// All files sharing one (album, artist) pair, in the order they were found.
#[derive(Debug, Clone)]
pub struct AlbumGroup {
    pub key: AlbumKey,
    pub files: Vec<PathBuf>,
}

pub struct ScanOptions<'a> {
    /// Directories whose path contains this are pruned. Empty disables pruning.
    pub exclude_marker: &'a str,
    /// Lowercase extensions without the leading dot.
    pub extensions: &'a [String],
}

pub struct ScanResult {
    pub groups: Vec<AlbumGroup>,
    pub files_seen: u64,
    pub dropped: u64,
}

/// Walk `root` and group audio files by album and artist.
pub fn scan(
    root: &Path,
    options: &ScanOptions<'_>,
    tags: &dyn TagStore,
) -> Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.display().to_string()));
    }

    // First pass: collect all audio file paths
    let audio_files = collect_audio_files(root, options);

    let pb = ProgressBar::new(audio_files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message("Reading tags...");

    let mut result = ScanResult {
        groups: Vec::new(),
        files_seen: audio_files.len() as u64,
        dropped: 0,
    };
    let mut index: HashMap<AlbumKey, usize> = HashMap::new();

    for path in audio_files {
        pb.inc(1);

        let info = match tags.read_tags(&path) {
            Ok(info) => info,
            Err(e) => {
                log::warn!("{e}, skipping");
                result.dropped += 1;
                continue;
            }
        };

        let (album, artist) = match (info.album, info.artist) {
            (Some(album), Some(artist)) => (album, artist),
            (album, _) => {
                let missing = if album.is_none() { "album" } else { "artist" };
                log::warn!("No {missing} tag for {}, skipping", path.display());
                result.dropped += 1;
                continue;
            }
        };

        let key = AlbumKey { album, artist };
        log::debug!("Found album {key}: {}", path.display());
        match index.get(&key) {
            Some(&i) => result.groups[i].files.push(path),
            None => {
                index.insert(key.clone(), result.groups.len());
                result.groups.push(AlbumGroup {
                    key,
                    files: vec![path],
                });
            }
        }
    }

    pb.finish_with_message(format!(
        "Done: {} albums, {} files dropped",
        result.groups.len(),
        result.dropped
    ));

    Ok(result)
}

/// Depth-first walk returning audio files in a stable order: files before
/// subdirectories, each sorted by name. Symlinks are not followed, so every
/// file is reached through exactly one path.
fn collect_audio_files(root: &Path, options: &ScanOptions<'_>) -> Vec<PathBuf> {
    let marker = options.exclude_marker;
    let walker = WalkDir::new(root)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|entry| {
            let excluded = is_excluded(entry, marker);
            if excluded {
                log::info!("Skipping excluded directory {}", entry.path().display());
            }
            !excluded
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), options.extensions) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_excluded(entry: &DirEntry, marker: &str) -> bool {
    !marker.is_empty()
        && entry.file_type().is_dir()
        && entry.path().to_string_lossy().contains(marker)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    extensions.iter().any(|e| *e == ext)
}
