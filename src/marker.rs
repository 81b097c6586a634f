use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("Failed to create run marker {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to remove run marker {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A file that exists while a run is in progress.
///
/// Only [`RunMarker::finish`] removes it. A run that aborts or is killed
/// leaves it behind, so its presence means "running or ended uncleanly".
/// It is a signal for outside observers, not a lock.
#[derive(Debug)]
pub struct RunMarker {
    path: PathBuf,
}

impl RunMarker {
    pub fn create(path: impl Into<PathBuf>, root: &Path) -> Result<Self, MarkerError> {
        let path = path.into();
        if path.exists() {
            log::warn!(
                "Run marker {} already exists: another run is active or the last one ended uncleanly",
                path.display()
            );
        }

        let contents = format!(
            "started={}\npid={}\nroot={}\n",
            chrono::Local::now().to_rfc3339(),
            std::process::id(),
            root.display()
        );
        fs::write(&path, contents).map_err(|source| MarkerError::Create {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Created run marker {}", path.display());

        Ok(Self { path })
    }

    /// Remove the marker after a clean run.
    pub fn finish(self) -> Result<(), MarkerError> {
        fs::remove_file(&self.path).map_err(|source| MarkerError::Remove {
            path: self.path.display().to_string(),
            source,
        })?;
        log::debug!("Removed run marker {}", self.path.display());
        Ok(())
    }
}
