pub mod models;

use std::cell::Cell;
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use thiserror::Error;

use crate::config::MusicBrainzConfig;
pub use models::CandidateRelease;
use models::{ReleaseLookup, SearchResponse};

#[derive(Error, Debug)]
pub enum MusicBrainzError {
    #[error("HTTP request failed for {what}: {source}")]
    Http {
        what: String,
        #[source]
        source: ureq::Error,
    },
    #[error("{0} not found")]
    NotFound(String),
    #[error("MusicBrainz unavailable or rate limited ({0})")]
    Unavailable(String),
}

/// The remote calls the tagger needs from a release database.
pub trait MetadataService {
    /// Search releases by album title and (optional) artist.
    fn search_releases(
        &self,
        album: &str,
        artist: Option<&str>,
    ) -> Result<Vec<CandidateRelease>, MusicBrainzError>;

    /// Ordered recording titles of a release, all media flattened.
    fn release_tracks(&self, release_id: &str) -> Result<Vec<String>, MusicBrainzError>;

    /// Cheap request used to check the service is reachable.
    fn ping(&self) -> Result<(), MusicBrainzError>;
}

/// Blocking MusicBrainz web service client (`/ws/2`, JSON).
pub struct MusicBrainzClient {
    agent: ureq::Agent,
    base_url: String,
    user_agent: String,
    search_limit: u32,
    min_interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            search_limit: config.search_limit,
            min_interval: Duration::from_millis(config.rate_limit_ms),
            last_request: Cell::new(None),
        }
    }

    /// Sleep until the rate limit allows another request.
    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::trace!("Rate limiting: waiting {wait:?}");
                thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn search(&self, query: &str, limit: u32) -> Result<SearchResponse, MusicBrainzError> {
        self.throttle();
        let url = format!("{}/release/", self.base_url);
        log::debug!("GET {url} query={query}");

        let what = format!("release search '{query}'");
        self.agent
            .get(&url)
            .header("User-Agent", self.user_agent.as_str())
            .query("query", query)
            .query("limit", limit.to_string())
            .query("fmt", "json")
            .call()
            .map_err(|e| map_error(&what, e))?
            .body_mut()
            .read_json()
            .map_err(|e| map_error(&what, e))
    }
}

impl MetadataService for MusicBrainzClient {
    fn search_releases(
        &self,
        album: &str,
        artist: Option<&str>,
    ) -> Result<Vec<CandidateRelease>, MusicBrainzError> {
        let query = release_query(album, artist);
        let resp = self.search(&query, self.search_limit)?;
        Ok(resp.releases.into_iter().map(Into::into).collect())
    }

    fn release_tracks(&self, release_id: &str) -> Result<Vec<String>, MusicBrainzError> {
        self.throttle();
        let url = format!("{}/release/{release_id}", self.base_url);
        log::debug!("GET {url}");

        let what = format!("release {release_id}");
        let lookup: ReleaseLookup = self
            .agent
            .get(&url)
            .header("User-Agent", self.user_agent.as_str())
            .query("inc", "recordings")
            .query("fmt", "json")
            .call()
            .map_err(|e| map_error(&what, e))?
            .body_mut()
            .read_json()
            .map_err(|e| map_error(&what, e))?;

        Ok(lookup.track_titles())
    }

    fn ping(&self) -> Result<(), MusicBrainzError> {
        self.search("release:(live)", 1).map(|_| ())
    }
}

fn map_error(what: &str, err: ureq::Error) -> MusicBrainzError {
    match err {
        ureq::Error::StatusCode(404) => MusicBrainzError::NotFound(what.to_string()),
        ureq::Error::StatusCode(status @ (429 | 503)) => {
            MusicBrainzError::Unavailable(format!("HTTP {status} for {what}"))
        }
        source => MusicBrainzError::Http {
            what: what.to_string(),
            source,
        },
    }
}

// Lucene query syntax characters that must be backslash-escaped in field values
static LUCENE_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([+\-&|!(){}\[\]^"~*?:\\/])"#).unwrap());

/// Build a `release:(...) artist:(...)` search query. Values are escaped and
/// lowercased so words like AND/OR are not read as operators.
pub fn release_query(album: &str, artist: Option<&str>) -> String {
    let mut clauses = Vec::new();
    for (field, value) in [("release", Some(album)), ("artist", artist)] {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        let escaped = LUCENE_SPECIAL.replace_all(value, r"\${1}").to_lowercase();
        clauses.push(format!("{field}:({escaped})"));
    }
    clauses.join(" ")
}

/// A live-classified release together with its track list.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCandidate {
    pub release: CandidateRelease,
    pub tracks: Vec<String>,
    /// The track list fetch failed; `tracks` is empty.
    pub tracks_failed: bool,
}

/// Outcome of a candidate lookup. A failed search and a search with no live
/// results lead to the same decision but are reported differently.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateLookup {
    Found(Vec<LiveCandidate>),
    Failed(String),
}

/// Search for an album, keep live releases, and fetch each one's track list.
///
/// Track lists are only fetched for releases that pass [`CandidateRelease::is_live`].
/// Errors never propagate: a failed search yields `Failed`, a failed track
/// list yields an empty list for that candidate.
pub fn live_candidates(
    service: &dyn MetadataService,
    album: &str,
    artist: Option<&str>,
) -> CandidateLookup {
    log::info!(
        "Searching MusicBrainz for album: {album}, artist: {}",
        artist.unwrap_or("<none>")
    );

    let releases = match service.search_releases(album, artist) {
        Ok(releases) => releases,
        Err(e) => {
            log::error!("Error querying MusicBrainz for {album}: {e}");
            return CandidateLookup::Failed(e.to_string());
        }
    };

    let total = releases.len();
    let mut candidates = Vec::new();
    for release in releases.into_iter().filter(CandidateRelease::is_live) {
        let (tracks, tracks_failed) = match service.release_tracks(&release.id) {
            Ok(tracks) => (tracks, false),
            Err(e) => {
                log::error!("Error fetching track list for release {}: {e}", release.id);
                (Vec::new(), true)
            }
        };
        log::debug!("Track list for '{}': {tracks:?}", release.title);
        candidates.push(LiveCandidate {
            release,
            tracks,
            tracks_failed,
        });
    }

    log::info!(
        "{total} results for {album}, {} classified live",
        candidates.len()
    );
    CandidateLookup::Found(candidates)
}
