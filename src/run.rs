use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ProbeConfig;
use crate::marker::{MarkerError, RunMarker};
use crate::musicbrainz::MetadataService;
use crate::probe::{self, ProbeError};
use crate::scanner::metadata::TagStore;
use crate::scanner::{self, ScanError, ScanOptions};
use crate::tagger::{RunSummary, Tagger};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("No supported audio extensions configured")]
    NoExtensions,
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error("Connectivity check failed, aborting before scanning: {0}")]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

pub struct RunOptions<'a> {
    pub root: &'a Path,
    /// `None` disables the run marker.
    pub marker_path: Option<PathBuf>,
    pub exclude_marker: &'a str,
    pub extensions: &'a [String],
    pub probe: &'a ProbeConfig,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RunReport {
    pub files_seen: u64,
    pub dropped: u64,
    pub summary: RunSummary,
}

/// One full pass over a library: marker, connectivity check, scan, tagging.
///
/// Nothing is scanned or written unless the service answered. The marker is
/// removed only when every step succeeded.
pub fn run(
    options: &RunOptions<'_>,
    tags: &dyn TagStore,
    service: &dyn MetadataService,
) -> Result<RunReport, RunError> {
    if options.extensions.is_empty() {
        return Err(RunError::NoExtensions);
    }

    let marker = options
        .marker_path
        .as_ref()
        .map(|path| RunMarker::create(path, options.root))
        .transpose()?;

    log::info!("Starting processing of directory: {}", options.root.display());
    probe::check_connectivity(service, options.probe)?;

    let scan_options = ScanOptions {
        exclude_marker: options.exclude_marker,
        extensions: options.extensions,
    };
    let scan = scanner::scan(options.root, &scan_options, tags)?;
    log::info!(
        "Scan complete: {} files, {} albums, {} dropped",
        scan.files_seen,
        scan.groups.len(),
        scan.dropped
    );

    let summary = Tagger::new(tags, service, options.dry_run).run(&scan.groups);

    log::info!("Processing of directory completed: {}", options.root.display());
    if let Some(marker) = marker {
        marker.finish()?;
    }

    Ok(RunReport {
        files_seen: scan.files_seen,
        dropped: scan.dropped,
        summary,
    })
}
