use indicatif::{ProgressBar, ProgressStyle};

use crate::classify::{self, LiveTitleCount};
use crate::matching::{self, MatchResult};
use crate::musicbrainz::{self, CandidateLookup, MetadataService};
use crate::scanner::AlbumGroup;
use crate::scanner::metadata::TagStore;

/// Prefix written in front of live album titles.
pub const LIVE_PREFIX: &str = "(Live) ";

/// Canonical live title: any existing "(Live)" markers removed, one prefix added.
pub fn live_album_title(album: &str) -> String {
    format!("{LIVE_PREFIX}{}", matching::strip_live_marker(album))
}

/// Why an album was accepted as live.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptBasis {
    /// Enough local track titles mention "live".
    LocalTitles(LiveTitleCount),
    /// A live MusicBrainz release matched the local track list.
    Remote {
        release_id: String,
        release_title: String,
        score: MatchResult,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accept(AcceptBasis),
    Reject,
}

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub albums: usize,
    pub accepted_local: usize,
    pub accepted_remote: usize,
    pub rejected: usize,
    pub files_rewritten: usize,
    pub already_tagged: usize,
    pub rewrite_failures: usize,
    pub lookup_failures: usize,
}

/// Decides per album whether it is live and rewrites album tags accordingly.
pub struct Tagger<'a> {
    tags: &'a dyn TagStore,
    service: &'a dyn MetadataService,
    dry_run: bool,
}

impl<'a> Tagger<'a> {
    pub fn new(tags: &'a dyn TagStore, service: &'a dyn MetadataService, dry_run: bool) -> Self {
        Self {
            tags,
            service,
            dry_run,
        }
    }

    /// Process every group in order, one at a time.
    pub fn run(&self, groups: &[AlbumGroup]) -> RunSummary {
        let pb = ProgressBar::new(groups.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} albums ({eta} remaining) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
        );

        let mut summary = RunSummary::default();
        for group in groups {
            pb.set_message(group.key.album.clone());
            self.process_album(group, &mut summary);
            pb.inc(1);
        }

        pb.finish_with_message("done");
        summary
    }

    /// Decide one album and rewrite its files on acceptance.
    pub fn process_album(&self, group: &AlbumGroup, summary: &mut RunSummary) -> Decision {
        log::info!("Processing album {}", group.key);
        summary.albums += 1;

        let decision = self.decide(group, summary);
        match &decision {
            Decision::Accept(AcceptBasis::LocalTitles(count)) => {
                summary.accepted_local += 1;
                log::info!(
                    "{} is live: {} of {} track titles mention live",
                    group.key,
                    count.live,
                    count.total
                );
                self.rewrite(group, summary);
            }
            Decision::Accept(AcceptBasis::Remote {
                release_id,
                release_title,
                score,
            }) => {
                summary.accepted_remote += 1;
                log::info!(
                    "Best match for {}: '{release_title}' ({release_id}) with {} matching tracks out of {}",
                    group.key,
                    score.matched,
                    score.total
                );
                self.rewrite(group, summary);
            }
            Decision::Reject => {
                summary.rejected += 1;
                log::info!("No live release found for {}, leaving it unchanged", group.key);
            }
        }
        decision
    }

    /// Local title heuristic first; MusicBrainz only when it is inconclusive.
    pub fn decide(&self, group: &AlbumGroup, summary: &mut RunSummary) -> Decision {
        let titles = self.local_titles(group);

        let count = classify::count_live_titles(&titles);
        if count.is_live_album() {
            return Decision::Accept(AcceptBasis::LocalTitles(count));
        }

        let artist = Some(group.key.artist.as_str()).filter(|a| !a.trim().is_empty());
        let candidates =
            match musicbrainz::live_candidates(self.service, &group.key.album, artist) {
                CandidateLookup::Found(candidates) => candidates,
                CandidateLookup::Failed(reason) => {
                    summary.lookup_failures += 1;
                    log::warn!("Lookup failed for {}: {reason}", group.key);
                    return Decision::Reject;
                }
            };
        summary.lookup_failures += candidates.iter().filter(|c| c.tracks_failed).count();

        match matching::best_match(&titles, &candidates) {
            Some((best, score)) => Decision::Accept(AcceptBasis::Remote {
                release_id: best.release.id.clone(),
                release_title: best.release.title.clone(),
                score,
            }),
            None => Decision::Reject,
        }
    }

    /// Track titles of every file in the group; unreadable or missing titles are empty.
    fn local_titles(&self, group: &AlbumGroup) -> Vec<String> {
        group
            .files
            .iter()
            .map(|path| match self.tags.read_tags(path) {
                Ok(info) => info.title.unwrap_or_default(),
                Err(e) => {
                    log::warn!("{e}");
                    String::new()
                }
            })
            .collect()
    }

    fn rewrite(&self, group: &AlbumGroup, summary: &mut RunSummary) {
        let new_album = live_album_title(&group.key.album);
        if new_album == group.key.album {
            log::info!("{} is already tagged as live", group.key);
            summary.already_tagged += group.files.len();
            return;
        }

        for path in &group.files {
            if self.dry_run {
                log::info!(
                    "Would update {}: '{}' -> '{new_album}'",
                    path.display(),
                    group.key.album
                );
                summary.files_rewritten += 1;
                continue;
            }

            match self.tags.write_album(path, &new_album) {
                Ok(()) => {
                    summary.files_rewritten += 1;
                    log::info!(
                        "Updated album '{}' to '{new_album}' in {}",
                        group.key.album,
                        path.display()
                    );
                }
                Err(e) => {
                    summary.rewrite_failures += 1;
                    log::error!("{e}");
                }
            }
        }
    }
}
