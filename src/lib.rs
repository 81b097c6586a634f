pub mod classify;
pub mod config;
pub mod marker;
pub mod matching;
pub mod musicbrainz;
pub mod probe;
pub mod run;
pub mod scanner;
pub mod tagger;

#[cfg(test)]
pub(crate) mod testing;

/// Audio file extensions lofty can both read and write tags for.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "m4a", "m4b", "mp4", "mp3", "flac", "ogg", "opus", "wav", "aif", "aiff", "ape", "wv",
];

/// Application name for XDG paths
pub const APP_NAME: &str = "livetagger";
