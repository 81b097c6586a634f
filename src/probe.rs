use std::thread;

use thiserror::Error;

use crate::config::ProbeConfig;
use crate::musicbrainz::{MetadataService, MusicBrainzError};

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("MusicBrainz unreachable after {attempts} attempts: {last}")]
    Unreachable {
        attempts: u32,
        #[source]
        last: MusicBrainzError,
    },
}

/// Check the service answers before any file is touched.
///
/// Retries with a fixed delay up to `config.attempts` times. After a success
/// it waits the delay once more so the first real request isn't rate limited.
pub fn check_connectivity(
    service: &dyn MetadataService,
    config: &ProbeConfig,
) -> Result<(), ProbeError> {
    let attempts = config.attempts.max(1);
    let delay = config.delay();

    let mut attempt = 1;
    loop {
        match service.ping() {
            Ok(()) => {
                log::info!("MusicBrainz reachable (attempt {attempt}/{attempts})");
                thread::sleep(delay);
                return Ok(());
            }
            Err(e) if attempt < attempts => {
                log::warn!(
                    "MusicBrainz not reachable (attempt {attempt}/{attempts}), retrying in {}s: {e}",
                    delay.as_secs()
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(ProbeError::Unreachable { attempts, last: e }),
        }
    }
}
