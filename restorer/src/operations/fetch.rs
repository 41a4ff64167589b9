// File: restorer/src/operations/fetch.rs
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::ArtifactConfig;
use crate::errors::RestoreError;
use crate::poll::{poll_until, PollOutcome};
use crate::services::transport::artifact_url;
use crate::services::ArtifactTransport;
use crate::types::{ArtifactSet, ArtifactState};

/// Best-effort download of the backup manifest into a session directory
pub struct ArtifactFetcher<'a> {
    transports: &'a [Box<dyn ArtifactTransport>],
    config: &'a ArtifactConfig,
}

impl<'a> ArtifactFetcher<'a> {
    pub fn new(transports: &'a [Box<dyn ArtifactTransport>], config: &'a ArtifactConfig) -> Self {
        Self { transports, config }
    }

    /// Downloads every manifest entry. Individual failures are recorded, not raised.
    pub async fn fetch<S: AsRef<str>>(&self, work_dir: &Path, manifest: &[S]) -> ArtifactSet {
        let mut set = ArtifactSet::from_manifest(manifest);

        let available: Vec<&dyn ArtifactTransport> = self
            .transports
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| t.available())
            .collect();

        if available.is_empty() {
            error!("No download transport available");
        } else {
            info!(
                "Downloading {} artifacts from {} via {}",
                set.len(),
                self.config.base_url,
                available.iter().map(|t| t.name()).collect::<Vec<_>>().join(" -> ")
            );
        }

        for artifact in set.artifacts.iter_mut() {
            let url = artifact_url(&self.config.base_url, &artifact.filename);
            let dest = work_dir.join(&artifact.filename);

            match self.download_with_retries(&available, &url, &dest).await {
                Some(size) => {
                    info!("✓ Downloaded {} ({} bytes)", artifact.filename, size);
                    artifact.state = ArtifactState::Downloaded;
                    artifact.size_bytes = Some(size);
                }
                None => {
                    warn!("Failed to download {}", artifact.filename);
                    artifact.state = ArtifactState::Failed;
                    let _ = tokio::fs::remove_file(&dest).await;
                }
            }
        }

        info!(
            "Fetch finished: {} downloaded, {} failed",
            set.count(ArtifactState::Downloaded),
            set.count(ArtifactState::Failed)
        );
        set
    }

    async fn download_with_retries(
        &self,
        transports: &[&dyn ArtifactTransport],
        url: &str,
        dest: &Path,
    ) -> Option<u64> {
        if transports.is_empty() {
            return None;
        }

        let outcome = poll_until(self.config.download_policy(), |attempt| async move {
            for transport in transports {
                match transport.download(url, dest).await {
                    Ok(size) => return Some(size),
                    Err(e) => {
                        debug!(
                            "Attempt {} via {} failed for {}: {}",
                            attempt,
                            transport.name(),
                            url,
                            e
                        );
                        let _ = tokio::fs::remove_file(dest).await;
                    }
                }
            }
            None
        })
        .await;

        match outcome {
            PollOutcome::Ready { value, .. } => Some(value),
            PollOutcome::Exhausted { attempts } => {
                debug!("Giving up on {} after {} attempts", url, attempts);
                None
            }
        }
    }

    /// Classifies downloaded files by size. Too-small files stay usable but suspect.
    pub async fn validate(&self, work_dir: &Path, set: &mut ArtifactSet) {
        for artifact in set.artifacts.iter_mut() {
            if artifact.state != ArtifactState::Downloaded {
                continue;
            }

            let path = work_dir.join(&artifact.filename);
            let size = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("{} vanished before validation: {}", artifact.filename, e);
                    artifact.state = ArtifactState::Failed;
                    continue;
                }
            };

            artifact.size_bytes = Some(size);
            if size < self.config.min_valid_size_bytes {
                warn!(
                    "{} is only {} bytes (threshold {}), restoring it anyway",
                    artifact.filename, size, self.config.min_valid_size_bytes
                );
                artifact.state = ArtifactState::ValidatedSuspect;
            } else {
                artifact.state = ArtifactState::ValidatedOk;
            }
        }
    }
}

/// Fails when no data file made it through download and validation
pub fn ensure_usable(set: &ArtifactSet) -> Result<(), RestoreError> {
    if set.has_usable_data() {
        return Ok(());
    }

    Err(RestoreError::FetchExhausted {
        attempted: set.len(),
        failed: set.count(ArtifactState::Failed),
    })
}
