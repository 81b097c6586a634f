use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

/// Settings read from `config.toml`. Every field has a default, so the file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directories whose path contains this are never scanned (EP releases by default).
    pub exclude_marker: String,
    /// Audio file extensions to scan.
    pub extensions: Vec<String>,
    /// Run marker written to the working directory while a run is in progress.
    /// Empty disables it.
    pub marker_file: String,
    /// MusicBrainz web service settings.
    pub musicbrainz: MusicBrainzConfig,
    /// Pre-flight connectivity check settings.
    pub probe: ProbeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exclude_marker: " - EP".to_string(),
            extensions: vec!["m4a".to_string()],
            marker_file: format!("{}.running", crate::APP_NAME),
            musicbrainz: MusicBrainzConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

/// MusicBrainz API configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    /// MusicBrainz rejects requests without an identifying User-Agent.
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    pub timeout_secs: u64,
    /// Maximum releases returned per search.
    pub search_limit: u32,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            user_agent: format!(
                "{}/{} ( https://github.com/livetagger/livetagger )",
                crate::APP_NAME,
                env!("CARGO_PKG_VERSION")
            ),
            rate_limit_ms: 1000,
            timeout_secs: 30,
            search_limit: 25,
        }
    }
}

/// Connectivity probe configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProbeConfig {
    /// Total attempts before the run is aborted.
    pub attempts: u32,
    /// Delay between attempts, and once after success.
    pub delay_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 5,
        }
    }
}

impl ProbeConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl AppConfig {
    /// Load config from `~/.config/livetagger/config.toml`.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    /// Logs a warning and returns defaults if the file can't be read or parsed.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Normalize configured extensions (lowercase, no dot) and drop any lofty
    /// can't write tags for.
    pub fn resolve_extensions(&self) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        for ext in &self.extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !crate::SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                log::warn!("Ignoring unsupported extension '{ext}'");
                continue;
            }
            if !resolved.contains(&ext) {
                resolved.push(ext);
            }
        }
        resolved
    }

    /// Run marker path, or `None` when disabled.
    pub fn marker_path(&self) -> Option<PathBuf> {
        let name = self.marker_file.trim();
        (!name.is_empty()).then(|| PathBuf::from(name))
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.exclude_marker, " - EP");
        assert_eq!(config.extensions, vec!["m4a"]);
        assert_eq!(config.marker_path(), Some(PathBuf::from("livetagger.running")));
        assert_eq!(config.musicbrainz.search_limit, 25);
        assert_eq!(config.musicbrainz.rate_limit_ms, 1000);
        assert!(config.musicbrainz.user_agent.starts_with("livetagger/"));
        assert_eq!(config.probe.attempts, 3);
        assert_eq!(config.probe.delay(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            exclude_marker = "[EP]"
            marker_file = ""

            [probe]
            attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.exclude_marker, "[EP]");
        assert_eq!(config.marker_path(), None);
        assert_eq!(config.probe.attempts, 5);
        assert_eq!(config.probe.delay_secs, 5);
        assert_eq!(config.musicbrainz.base_url, "https://musicbrainz.org/ws/2");
        assert_eq!(config.extensions, vec!["m4a"]);
    }

    #[test]
    fn extensions_are_normalized_and_filtered() {
        let config = AppConfig {
            extensions: vec![".M4A".into(), "flac".into(), "m4a".into(), "txt".into()],
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_extensions(), vec!["m4a", "flac"]);
    }

    #[test]
    fn load_from_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "probe = \"not a table\"").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.probe.attempts, 3);

        let config = AppConfig::load_from(&dir.path().join("missing.toml"));
        assert_eq!(config.exclude_marker, " - EP");
    }

    #[test]
    fn load_from_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "extensions = [\"mp3\"]\n[musicbrainz]\nrate_limit_ms = 1500\n").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.extensions, vec!["mp3"]);
        assert_eq!(config.musicbrainz.rate_limit_ms, 1500);
    }
}
