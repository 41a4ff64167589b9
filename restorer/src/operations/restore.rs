// File: restorer/src/operations/restore.rs
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::connectivity::ConnectivityChecker;
use super::fetch::{ensure_usable, ArtifactFetcher};
use super::probe::EnvironmentProbe;
use super::service_control::ServiceController;
use crate::config::Config;
use crate::errors::{RestoreError, StartFailure, StartFailureReason};
use crate::poll::{poll_until, PollOutcome};
use crate::services::transport::default_transports;
use crate::services::{ArtifactTransport, CommandRunner, ContainerRuntime, MongoAccess};
use crate::session::RestoreSession;
use crate::types::{
    ArtifactSet, ArtifactState, DeploymentHandle, DeploymentKind, Outcome, RestoreReport,
    RestoreState,
};

/// Drives one restore session from probing to cleanup
pub struct RestoreOrchestrator {
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    transports: Vec<Box<dyn ArtifactTransport>>,
}

/// Mutable bookkeeping of a run that is not part of the session itself
#[derive(Default)]
struct RunContext {
    failure: Option<RestoreError>,
    restore_succeeded: bool,
    staging_path: Option<String>,
    restored_collections: Vec<String>,
    missing_collections: Vec<String>,
    cleanup_warnings: Vec<String>,
}

impl RestoreOrchestrator {
    pub fn new(
        config: Arc<Config>,
        runner: Arc<dyn CommandRunner>,
        transports: Vec<Box<dyn ArtifactTransport>>,
    ) -> Self {
        Self {
            config,
            runner,
            transports,
        }
    }

    /// Orchestrator using the HTTP client with `wget`/`curl` fallbacks
    pub fn with_default_transports(config: Arc<Config>, runner: Arc<dyn CommandRunner>) -> Self {
        let transports = default_transports(&config.artifacts, runner.clone());
        Self::new(config, runner, transports)
    }

    /// Runs a full session. Never returns early: every path ends in `Done`
    /// with the working directory removed.
    pub async fn run(&self, cancel: &CancellationToken) -> RestoreReport {
        let started_at = Utc::now();
        let mut states = vec![RestoreState::Init];

        let mut session =
            match RestoreSession::create(&self.config.artifacts.work_parent, &self.config.artifacts.files)
                .await
            {
                Ok(session) => session,
                Err(e) => {
                    error!("{}", e);
                    states.push(RestoreState::Done(Outcome::Failed));
                    return RestoreReport {
                        session_id: String::new(),
                        work_dir: String::new(),
                        deployment_kind: None,
                        deployment_handle: None,
                        states,
                        artifacts: ArtifactSet::from_manifest(&self.config.artifacts.files),
                        restored_collections: Vec::new(),
                        missing_collections: Vec::new(),
                        error: Some(e.to_string()),
                        cleanup_warnings: Vec::new(),
                        outcome: Outcome::Failed,
                        service_status: Vec::new(),
                        started_at,
                        finished_at: Utc::now(),
                    };
                }
            };

        let mut ctx = RunContext::default();
        let mut state = RestoreState::Probing;

        loop {
            if cancel.is_cancelled()
                && !matches!(state, RestoreState::CleaningUp | RestoreState::Done(_))
            {
                warn!("Cancellation requested before {:?}, cleaning up", state);
                ctx.failure.get_or_insert(RestoreError::Cancelled);
                state = RestoreState::CleaningUp;
            }

            states.push(state);
            if state.is_terminal() {
                break;
            }

            let next = match self.step(state, &mut session, &mut ctx).await {
                Ok(next) => next,
                Err(e) => {
                    error!("{}", e);
                    ctx.failure = Some(e);
                    RestoreState::CleaningUp
                }
            };
            debug!("{:?} -> {:?}", state, next);
            state = next;
        }

        let outcome = match state {
            RestoreState::Done(outcome) => outcome,
            _ => Outcome::Failed,
        };

        RestoreReport {
            session_id: session.id.clone(),
            work_dir: session.work_dir.display().to_string(),
            deployment_kind: session.probed_kind(),
            deployment_handle: session.handle.clone(),
            states,
            artifacts: session.artifacts.clone(),
            restored_collections: ctx.restored_collections,
            missing_collections: ctx.missing_collections,
            error: ctx.failure.map(|e| e.to_string()),
            cleanup_warnings: ctx.cleanup_warnings,
            outcome,
            service_status: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn step(
        &self,
        state: RestoreState,
        session: &mut RestoreSession,
        ctx: &mut RunContext,
    ) -> Result<RestoreState, RestoreError> {
        let runner = self.runner.as_ref();
        let config = self.config.as_ref();

        match state {
            RestoreState::Init | RestoreState::Probing => {
                info!("Step 1: detecting database deployment");
                let (kind, handle) = EnvironmentProbe::new(runner, config).probe().await;
                info!("✓ Deployment: {} [{}]", kind, handle);
                session.record_probe(kind, handle);

                match kind {
                    DeploymentKind::NotInstalled => Err(StartFailure::new(
                        StartFailureReason::NotInstalled,
                        "neither a database container nor native tools were found",
                    )
                    .into()),
                    kind if kind.needs_start() => Ok(RestoreState::Starting),
                    _ => Ok(RestoreState::CheckingConnectivity),
                }
            }

            RestoreState::Starting => {
                info!("Step 2: starting database");
                let (kind, handle) = deployment(session)?;
                let (running_kind, running_handle) = ServiceController::new(runner, config)
                    .ensure_running(kind, &handle)
                    .await?;
                session.active_kind = Some(running_kind);
                session.handle = Some(running_handle);
                Ok(RestoreState::CheckingConnectivity)
            }

            RestoreState::CheckingConnectivity => {
                info!("Step 3: checking database connectivity");
                let (kind, handle) = deployment(session)?;
                let checker = ConnectivityChecker::new(runner, config);
                // A just-started server can refuse connections for a while
                let policy = config.database.connect_policy();
                let (checker, handle) = (&checker, &handle);
                match poll_until(policy, |_| async move {
                    checker.check_alive(kind, handle).await.then_some(())
                })
                .await
                {
                    PollOutcome::Ready { attempts, .. } => {
                        debug!("Database answered after {} pings", attempts);
                        Ok(RestoreState::Fetching)
                    }
                    PollOutcome::Exhausted { attempts } => {
                        warn!("Database did not answer {} pings", attempts);
                        Err(RestoreError::ConnectivityFailure {
                            access_path: checker.access_path(handle),
                        })
                    }
                }
            }

            RestoreState::Fetching => {
                info!("Step 4: downloading backup artifacts");
                let fetcher = ArtifactFetcher::new(&self.transports, &config.artifacts);
                session.artifacts = fetcher
                    .fetch(&session.work_dir, &config.artifacts.files)
                    .await;
                Ok(RestoreState::ValidatingArtifacts)
            }

            RestoreState::ValidatingArtifacts => {
                info!("Step 5: validating artifacts");
                let fetcher = ArtifactFetcher::new(&self.transports, &config.artifacts);
                fetcher
                    .validate(&session.work_dir, &mut session.artifacts)
                    .await;
                ensure_usable(&session.artifacts)?;
                info!(
                    "✓ {} usable data files",
                    session.artifacts.usable_data().count()
                );
                Ok(RestoreState::Restoring)
            }

            RestoreState::Restoring => {
                info!("Step 6: restoring database '{}'", config.database.name);
                self.restore(session, ctx).await?;
                ctx.restore_succeeded = true;
                info!("✓ Restore tool finished successfully");
                Ok(RestoreState::VerifyingRestore)
            }

            RestoreState::VerifyingRestore => {
                info!("Step 7: verifying restored collections");
                self.verify(session, ctx).await;
                Ok(RestoreState::CleaningUp)
            }

            RestoreState::CleaningUp => {
                info!("Step 8: cleaning up");
                self.cleanup(session, ctx).await;
                Ok(RestoreState::Done(final_outcome(ctx, &session.artifacts)))
            }

            RestoreState::Done(outcome) => Ok(RestoreState::Done(outcome)),
        }
    }

    async fn restore(
        &self,
        session: &RestoreSession,
        ctx: &mut RunContext,
    ) -> Result<(), RestoreError> {
        let (_, handle) = deployment(session)?;
        let runner = self.runner.as_ref();
        let config = self.config.as_ref();
        let access = MongoAccess::new(runner, &config.database, &config.container);

        let result = match &handle {
            DeploymentHandle::Container(container) => {
                let runtime = ContainerRuntime::new(
                    runner,
                    &config.container.runtime,
                    config.container.command_timeout(),
                );
                let staging = format!("{}_{}", config.container.staging_path, session.id);
                ctx.staging_path = Some(staging.clone());

                async {
                    runtime.make_dir(container, &staging).await?;
                    runtime
                        .copy_into(container, &session.work_dir, &staging)
                        .await?;
                    access.restore(&handle, &staging).await
                }
                .await
            }
            DeploymentHandle::Host => {
                let source = session.work_dir.to_string_lossy();
                access.restore(&handle, &source).await
            }
        };

        result.map_err(|e| RestoreError::RestoreToolFailure {
            reason: e.to_string(),
        })
    }

    /// Observational only: mismatches are warnings
    async fn verify(&self, session: &RestoreSession, ctx: &mut RunContext) {
        let handle = match session.handle.as_ref() {
            Some(handle) => handle,
            None => return,
        };
        let access = MongoAccess::new(
            self.runner.as_ref(),
            &self.config.database,
            &self.config.container,
        );

        let collections = match access.list_collections(handle).await {
            Ok(collections) => collections,
            Err(e) => {
                warn!("Could not list collections after restore: {}", e);
                return;
            }
        };

        info!("Collections in '{}': {}", self.config.database.name, collections.join(", "));

        let missing: Vec<String> = session
            .artifacts
            .expected_collections()
            .into_iter()
            .filter(|expected| !collections.contains(expected))
            .collect();

        if missing.is_empty() {
            info!("✓ All restored collections present");
        } else {
            warn!("Collections missing after restore: {}", missing.join(", "));
        }

        ctx.restored_collections = collections;
        ctx.missing_collections = missing;
    }

    async fn cleanup(&self, session: &mut RestoreSession, ctx: &mut RunContext) {
        if let (Some(staging), Some(DeploymentHandle::Container(container))) =
            (ctx.staging_path.as_deref(), session.handle.as_ref())
        {
            let runtime = ContainerRuntime::new(
                self.runner.as_ref(),
                &self.config.container.runtime,
                self.config.container.command_timeout(),
            );
            match runtime.remove_path(container, staging).await {
                Ok(()) => info!("✓ Removed staging path {} in {}", staging, container.name),
                Err(e) => {
                    let err = RestoreError::CleanupFailure {
                        path: format!("{}:{}", container.name, staging),
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    ctx.cleanup_warnings.push(err.to_string());
                }
            }
        }

        match session.release().await {
            Ok(()) => info!("✓ Removed working directory {}", session.work_dir.display()),
            Err(e) => {
                warn!("{}", e);
                ctx.cleanup_warnings.push(e.to_string());
            }
        }
    }
}

fn deployment(session: &RestoreSession) -> Result<(DeploymentKind, DeploymentHandle), RestoreError> {
    match (session.active_kind, session.handle.clone()) {
        (Some(kind), Some(handle)) => Ok((kind, handle)),
        _ => Err(RestoreError::Session {
            reason: "deployment was not probed".to_string(),
        }),
    }
}

fn final_outcome(ctx: &RunContext, artifacts: &ArtifactSet) -> Outcome {
    if ctx.failure.is_some() || !ctx.restore_succeeded {
        Outcome::Failed
    } else if artifacts.is_degraded() {
        Outcome::PartialSuccess
    } else {
        Outcome::Success
    }
}

/// Prints the final summary block
pub fn log_summary(report: &RestoreReport) {
    info!("==================== RESTORE SUMMARY ====================");
    info!("Session:      {}", report.session_id);
    match (&report.deployment_kind, &report.deployment_handle) {
        (Some(kind), Some(handle)) => info!("Deployment:   {} [{}]", kind, handle),
        _ => info!("Deployment:   unknown"),
    }
    info!(
        "Artifacts:    {} ok, {} suspect, {} failed of {}",
        report.artifacts.count(ArtifactState::ValidatedOk),
        report.artifacts.count(ArtifactState::ValidatedSuspect),
        report.artifacts.count(ArtifactState::Failed),
        report.artifacts.len()
    );
    if !report.restored_collections.is_empty() {
        info!("Collections:  {}", report.restored_collections.join(", "));
    }
    if !report.missing_collections.is_empty() {
        warn!("Missing:      {}", report.missing_collections.join(", "));
    }
    for entry in &report.service_status {
        info!("Service:      {} = {}", entry.service, entry.status);
    }
    for warning in &report.cleanup_warnings {
        warn!("Cleanup:      {}", warning);
    }
    match (&report.outcome, &report.error) {
        (Outcome::Failed, Some(e)) => error!("Outcome:      {} ({})", report.outcome, e),
        (Outcome::Failed, None) => error!("Outcome:      {}", report.outcome),
        (Outcome::PartialSuccess, _) => warn!("Outcome:      {}", report.outcome),
        (Outcome::Success, _) => info!("Outcome:      {}", report.outcome),
    }
    info!("=========================================================");
}
