// File: restorer/src/types.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::constants;

// === DEPLOYMENT ===

/// How the database is hosted and whether it is up, resolved once per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeploymentKind {
    ContainerRunning,
    ContainerStopped,
    NativeRunning,
    NativeInstalledNotRunning,
    NotInstalled,
}

impl DeploymentKind {
    /// Kinds that need a start before anything else can happen
    pub fn needs_start(&self) -> bool {
        match self {
            DeploymentKind::ContainerStopped | DeploymentKind::NativeInstalledNotRunning => true,
            DeploymentKind::ContainerRunning
            | DeploymentKind::NativeRunning
            | DeploymentKind::NotInstalled => false,
        }
    }
}

impl fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeploymentKind::ContainerRunning => "container (running)",
            DeploymentKind::ContainerStopped => "container (stopped)",
            DeploymentKind::NativeRunning => "native service (running)",
            DeploymentKind::NativeInstalledNotRunning => "native install (not running)",
            DeploymentKind::NotInstalled => "not installed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
}

/// What the controller and restore steps act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeploymentHandle {
    Container(ContainerRef),
    /// Host-wide: the local service manager and client binaries
    Host,
}

impl DeploymentHandle {
    pub fn container(&self) -> Option<&ContainerRef> {
        match self {
            DeploymentHandle::Container(container) => Some(container),
            DeploymentHandle::Host => None,
        }
    }
}

impl fmt::Display for DeploymentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentHandle::Container(c) => write!(f, "{} ({})", c.name, c.id),
            DeploymentHandle::Host => write!(f, "host"),
        }
    }
}

// === ARTIFACTS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactRole {
    Data,
    Metadata,
}

impl ArtifactRole {
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(constants::artifacts::DATA_EXTENSION) {
            ArtifactRole::Data
        } else {
            ArtifactRole::Metadata
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactState {
    Pending,
    Downloaded,
    ValidatedOk,
    /// Downloaded but smaller than the size threshold
    ValidatedSuspect,
    Failed,
}

impl ArtifactState {
    pub fn is_usable(&self) -> bool {
        matches!(self, ArtifactState::ValidatedOk | ArtifactState::ValidatedSuspect)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub filename: String,
    pub role: ArtifactRole,
    pub state: ArtifactState,
    pub size_bytes: Option<u64>,
}

impl Artifact {
    pub fn pending(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            role: ArtifactRole::from_filename(&filename),
            filename,
            state: ArtifactState::Pending,
            size_bytes: None,
        }
    }

    /// Collection name shared by a data file and its metadata companion
    pub fn collection(&self) -> &str {
        let name = self.filename.as_str();
        name.strip_suffix(constants::artifacts::DATA_EXTENSION)
            .or_else(|| name.strip_suffix(".metadata.json"))
            .or_else(|| name.strip_suffix(constants::artifacts::METADATA_EXTENSION))
            .unwrap_or(name)
    }
}

/// Manifest-ordered artifacts of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn from_manifest<S: AsRef<str>>(manifest: &[S]) -> Self {
        Self {
            artifacts: manifest.iter().map(|f| Artifact::pending(f.as_ref())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn count(&self, state: ArtifactState) -> usize {
        self.artifacts.iter().filter(|a| a.state == state).count()
    }

    /// Data files that may be handed to the restore tool
    pub fn usable_data(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts
            .iter()
            .filter(|a| a.role == ArtifactRole::Data && a.state.is_usable())
    }

    pub fn has_usable_data(&self) -> bool {
        self.usable_data().next().is_some()
    }

    /// True when some artifact is suspect or failed
    pub fn is_degraded(&self) -> bool {
        self.artifacts.iter().any(|a| {
            matches!(a.state, ArtifactState::ValidatedSuspect | ArtifactState::Failed)
        })
    }

    /// Collections the restore is expected to produce
    pub fn expected_collections(&self) -> Vec<String> {
        self.usable_data().map(|a| a.collection().to_string()).collect()
    }
}

// === SESSION STATE ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    PartialSuccess,
    Failed,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "SUCCESS"),
            Outcome::PartialSuccess => write!(f, "PARTIAL SUCCESS"),
            Outcome::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RestoreState {
    Init,
    Probing,
    Starting,
    CheckingConnectivity,
    Fetching,
    ValidatingArtifacts,
    Restoring,
    VerifyingRestore,
    CleaningUp,
    Done(Outcome),
}

impl RestoreState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RestoreState::Done(_))
    }
}

// === REPORT ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatusEntry {
    pub service: String,
    pub status: String,
}

/// Everything a caller needs to know about a finished session
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub session_id: String,
    pub work_dir: String,
    pub deployment_kind: Option<DeploymentKind>,
    pub deployment_handle: Option<DeploymentHandle>,
    pub states: Vec<RestoreState>,
    pub artifacts: ArtifactSet,
    pub restored_collections: Vec<String>,
    pub missing_collections: Vec<String>,
    pub error: Option<String>,
    pub cleanup_warnings: Vec<String>,
    pub outcome: Outcome,
    pub service_status: Vec<ServiceStatusEntry>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RestoreReport {
    pub fn visited(&self, state: RestoreState) -> bool {
        self.states.contains(&state)
    }

    pub fn exit_code(&self) -> u8 {
        if self.outcome.is_failure() {
            1
        } else {
            0
        }
    }

    /// Writes the report as pretty JSON. The outcome is already decided,
    /// so callers only log a failure here.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }
}
