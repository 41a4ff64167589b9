//! One end-to-end restore run and the working directory it owns

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants;
use crate::errors::RestoreError;
use crate::types::{ArtifactSet, DeploymentHandle, DeploymentKind};

pub struct RestoreSession {
    pub id: String,
    pub work_dir: PathBuf,
    /// Kind reported by the probe; set once
    probed_kind: Option<DeploymentKind>,
    /// Kind after `ensure_running`
    pub active_kind: Option<DeploymentKind>,
    pub handle: Option<DeploymentHandle>,
    pub artifacts: ArtifactSet,
    released: bool,
}

impl RestoreSession {
    /// Creates a fresh, uniquely named working directory under `parent`
    pub async fn create<S: AsRef<str>>(parent: &Path, manifest: &[S]) -> Result<Self, RestoreError> {
        let started_at = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}_{}", started_at.format("%Y%m%d_%H%M%S"), &suffix[..8]);
        let work_dir = parent.join(format!("{}_{}", constants::artifacts::WORK_DIR_PREFIX, id));

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RestoreError::Session {
                reason: format!("cannot create {}: {}", parent.display(), e),
            })?;

        // create_dir, not create_dir_all: an existing directory must never be reused
        tokio::fs::create_dir(&work_dir)
            .await
            .map_err(|e| RestoreError::Session {
                reason: format!("cannot create {}: {}", work_dir.display(), e),
            })?;

        info!("Session {} working directory: {}", id, work_dir.display());

        Ok(Self {
            id,
            work_dir,
            probed_kind: None,
            active_kind: None,
            handle: None,
            artifacts: ArtifactSet::from_manifest(manifest),
            released: false,
        })
    }

    pub fn record_probe(&mut self, kind: DeploymentKind, handle: DeploymentHandle) {
        if self.probed_kind.is_some() {
            warn!("Deployment already probed for session {}; keeping first result", self.id);
            return;
        }
        self.probed_kind = Some(kind);
        self.active_kind = Some(kind);
        self.handle = Some(handle);
    }

    pub fn probed_kind(&self) -> Option<DeploymentKind> {
        self.probed_kind
    }

    /// Removes the working directory. Safe to call more than once.
    pub async fn release(&mut self) -> Result<(), RestoreError> {
        if self.released {
            return Ok(());
        }

        match tokio::fs::remove_dir_all(&self.work_dir).await {
            Ok(()) => {
                debug!("Removed {}", self.work_dir.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(RestoreError::CleanupFailure {
                    path: self.work_dir.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        self.released = true;
        Ok(())
    }
}

impl Drop for RestoreSession {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_dir_all(&self.work_dir);
        }
    }
}
