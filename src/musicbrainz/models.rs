use serde::Deserialize;

/// A release returned by a MusicBrainz search, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRelease {
    pub id: String,
    pub title: String,
    pub primary_type: Option<String>,
    pub secondary_types: Vec<String>,
}

impl CandidateRelease {
    /// Live when the primary type or any secondary type mentions "live".
    pub fn is_live(&self) -> bool {
        let is_live = |t: &String| t.to_lowercase().contains("live");
        self.primary_type.iter().any(is_live) || self.secondary_types.iter().any(is_live)
    }
}

/// `/release?query=...` response (partial).
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub releases: Vec<SearchRelease>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRelease {
    pub id: String,
    pub title: String,
    #[serde(rename = "release-group")]
    pub release_group: Option<ReleaseGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseGroup {
    #[serde(rename = "primary-type")]
    pub primary_type: Option<String>,
    #[serde(rename = "secondary-types")]
    pub secondary_types: Option<Vec<String>>,
}

impl From<SearchRelease> for CandidateRelease {
    fn from(release: SearchRelease) -> Self {
        let (primary_type, secondary_types) = match release.release_group {
            Some(group) => (group.primary_type, group.secondary_types.unwrap_or_default()),
            None => (None, Vec::new()),
        };
        Self {
            id: release.id,
            title: release.title,
            primary_type,
            secondary_types,
        }
    }
}

/// `/release/<id>?inc=recordings` response (partial).
#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseLookup {
    #[serde(default)]
    pub media: Vec<Medium>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Medium {
    #[serde(default)]
    pub tracks: Vec<MediumTrack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediumTrack {
    pub title: Option<String>,
    pub recording: Option<Recording>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Recording {
    pub title: String,
}

impl ReleaseLookup {
    /// Recording titles across all media, in disc then track order.
    pub fn track_titles(self) -> Vec<String> {
        self.media
            .into_iter()
            .flat_map(|medium| medium.tracks)
            .filter_map(|track| track.recording.map(|r| r.title).or(track.title))
            .collect()
    }
}
