use regex::Regex;
use similar::{Algorithm, DiffOp};
use std::sync::LazyLock;

use crate::musicbrainz::LiveCandidate;

/// Two titles match when their similarity is above this.
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// A release is accepted when more than this share of its tracks matched.
pub const RELEASE_MATCH_THRESHOLD: f64 = 0.75;

// "(Live)" in any case, with the whitespace around it
static LIVE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(live\)\s*").unwrap());

/// Remove every "(Live)" marker, collapsing the surrounding whitespace.
pub fn strip_live_marker(title: &str) -> String {
    LIVE_MARKER_RE.replace_all(title, " ").trim().to_string()
}

/// Match ratio `2 * M / T` over characters, where `M` is the number of
/// characters in matching blocks and `T` the combined length. Lies in [0, 1];
/// 1.0 for identical strings, including two empty ones.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = similar::capture_diff_slices(Algorithm::Myers, &a, &b)
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();
    2.0 * matched as f64 / total as f64
}

/// Matched local titles against one candidate's track count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: usize,
    pub total: usize,
}

impl MatchResult {
    pub fn is_confident(&self) -> bool {
        self.total > 0 && self.matched as f64 / self.total as f64 > RELEASE_MATCH_THRESHOLD
    }
}

/// Count local titles that have at least one sufficiently similar remote title.
///
/// Matching is greedy: one remote title can satisfy several local titles.
/// Blank local titles never match. The count is capped at the remote track
/// count so `matched <= total` always holds.
pub fn match_tracks(local_titles: &[String], remote_titles: &[String]) -> MatchResult {
    let matched = local_titles
        .iter()
        .map(|t| strip_live_marker(t))
        .filter(|cleaned| !cleaned.is_empty())
        .filter(|cleaned| {
            remote_titles
                .iter()
                .any(|remote| title_similarity(cleaned, remote) > TITLE_SIMILARITY_THRESHOLD)
        })
        .count();

    MatchResult {
        matched: matched.min(remote_titles.len()),
        total: remote_titles.len(),
    }
}

/// Score every candidate and return the confident one with the most matches.
/// Ties keep the earlier candidate.
pub fn best_match<'a>(
    local_titles: &[String],
    candidates: &'a [LiveCandidate],
) -> Option<(&'a LiveCandidate, MatchResult)> {
    let mut best: Option<(&LiveCandidate, MatchResult)> = None;

    for candidate in candidates {
        let score = match_tracks(local_titles, &candidate.tracks);
        log::info!(
            "Checking release: {}, {} matches out of {} tracks",
            candidate.release.title,
            score.matched,
            score.total
        );
        if !score.is_confident() {
            continue;
        }
        if best.is_none_or(|(_, b)| score.matched > b.matched) {
            best = Some((candidate, score));
        }
    }

    best
}
