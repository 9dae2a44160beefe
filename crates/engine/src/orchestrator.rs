//! The migration state machine.
//!
//! One call to [`MigrationOrchestrator::execute`] drives one job from
//! `queued` through `running` to a terminal `completed`/`failed`:
//! context resolution, provider role validation, two connectivity checks,
//! target planning, then the paced phase pipeline. Progress and log
//! writes go through the [`JobStore`] after every increment, so a crash
//! mid-phase leaves an accurate resumption point even though automatic
//! resume is not implemented.
//!
//! Every failure path funnels through the outer guard in `execute`, which
//! forces the job to `failed` and appends a `"Failed: <kind>: <detail>"`
//! log entry before the error propagates. A job can therefore never stay
//! stuck in `running` after its execution task has died.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use vmshift_core::types::DbId;
use vmshift_db::models::{JobStatus, Provider, ProviderKind};
use vmshift_gateway::{ProviderEndpoint, ProviderGateway};

use crate::error::EngineError;
use crate::events::{EngineEvent, EVENT_CHANNEL_CAPACITY};
use crate::phases::{
    MIGRATION_PHASES, PROGRESS_PLANNED, PROGRESS_SOURCE_CONNECTED, PROGRESS_TARGETS_FETCHED,
};
use crate::store::{JobStore, JobUpdate, StoreError};

/// How the phase pipeline paces its progress increments.
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    /// Progress points added per increment.
    pub step: i16,
    /// Sleep between increments; this is the engine's yield point.
    pub delay: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            step: 5,
            delay: Duration::from_millis(200),
        }
    }
}

/// Result payload of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    pub job_id: DbId,
    pub vm_name: String,
    pub target_node: String,
}

/// Drives queued migration jobs to a terminal state.
pub struct MigrationOrchestrator {
    store: Arc<dyn JobStore>,
    gateway: Arc<dyn ProviderGateway>,
    pacing: PacingConfig,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl MigrationOrchestrator {
    pub fn new(store: Arc<dyn JobStore>, gateway: Arc<dyn ProviderGateway>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            gateway,
            pacing: PacingConfig::default(),
            event_tx,
        }
    }

    /// Override the pacing (tests use a near-zero delay).
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Subscribe to engine lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Execute one migration run to a terminal state.
    ///
    /// The outer guard: on any failure after the job row was loaded, the
    /// job is forced to `failed` with a log entry naming the error kind
    /// and detail, then the error is returned for the dispatcher's
    /// caller-visible channel.
    pub async fn execute(&self, job_id: DbId) -> Result<MigrationOutcome, EngineError> {
        match self.run(job_id).await {
            Ok(outcome) => {
                let _ = self.event_tx.send(EngineEvent::JobCompleted {
                    job_id,
                    target_node: outcome.target_node.clone(),
                });
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(job_id, kind = err.kind(), error = %err, "Migration job failed");
                self.mark_failed(job_id, &err).await;
                let _ = self.event_tx.send(EngineEvent::JobFailed {
                    job_id,
                    kind: err.kind(),
                    detail: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run(&self, job_id: DbId) -> Result<MigrationOutcome, EngineError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or(EngineError::JobNotFound(job_id))?;

        // Entering `running` is the only point where progress resets.
        self.store
            .update_job(
                job_id,
                JobUpdate::status(JobStatus::Running).with_progress(0),
            )
            .await?;
        self.store
            .append_log(job_id, "Starting migration workflow.")
            .await?;
        tracing::info!(
            job_id,
            vm_name = %job.vm_name,
            source_provider = ?job.source_provider_id,
            destination_provider = ?job.destination_provider_id,
            "Migration job started",
        );
        let _ = self.event_tx.send(EngineEvent::JobStarted {
            job_id,
            vm_name: job.vm_name.clone(),
        });

        // Resolve provider and VM context.
        let source_provider = match job.source_provider_id {
            Some(id) => self.store.find_provider(id).await?,
            None => None,
        };
        let dest_provider = match job.destination_provider_id {
            Some(id) => self.store.find_provider(id).await?,
            None => None,
        };
        let vm = match job.source_vm_id {
            Some(id) => self.store.find_vm(id).await?,
            None => None,
        };

        let (Some(source_provider), Some(dest_provider), Some(vm)) =
            (source_provider, dest_provider, vm)
        else {
            return Err(EngineError::MissingContext(format!(
                "Job {job_id} is missing provider or VM context \
                 (source provider {:?}, destination provider {:?}, source VM {:?})",
                job.source_provider_id, job.destination_provider_id, job.source_vm_id,
            )));
        };

        // Validate provider roles before touching the network.
        if source_provider.kind() != Some(ProviderKind::Vcenter) {
            return Err(EngineError::RoleMismatch(format!(
                "Source provider '{}' must be a vCenter instance",
                source_provider.name,
            )));
        }
        if dest_provider.kind() != Some(ProviderKind::Proxmox) {
            return Err(EngineError::RoleMismatch(format!(
                "Destination provider '{}' must be a Proxmox VE instance",
                dest_provider.name,
            )));
        }

        // Connectivity: source. A failed check leaves progress below 10.
        let inventory = self
            .gateway
            .fetch_source_inventory(&endpoint_for(&source_provider))
            .await?;
        self.persist_progress(job_id, PROGRESS_SOURCE_CONNECTED)
            .await?;
        self.store
            .append_log(
                job_id,
                &format!(
                    "Connectivity to vCenter source confirmed ({} VMs visible).",
                    inventory.vms.len(),
                ),
            )
            .await?;

        // Connectivity: destination, capturing the candidate node list.
        let targets = self
            .gateway
            .fetch_destination_targets(&endpoint_for(&dest_provider))
            .await?;
        self.persist_progress(job_id, PROGRESS_TARGETS_FETCHED)
            .await?;
        self.store
            .append_log(
                job_id,
                &format!(
                    "Connectivity to Proxmox destination confirmed ({} candidate nodes).",
                    targets.len(),
                ),
            )
            .await?;

        // Planning: a pre-specified target wins; otherwise first candidate.
        let target_node = match job.target_node.clone() {
            Some(node) => node,
            None => {
                let first = targets.first().ok_or(EngineError::NoTargetAvailable)?;
                self.store
                    .update_job(job_id, JobUpdate::target_node(first.name.clone()))
                    .await?;
                first.name.clone()
            }
        };
        self.persist_progress(job_id, PROGRESS_PLANNED).await?;
        self.store
            .append_log(
                job_id,
                &format!(
                    "Prepared migration plan for VM '{}' (source id {}) to Proxmox node '{}'.",
                    vm.name, vm.source_identifier, target_node,
                ),
            )
            .await?;

        // The transfer pipeline: persist after every increment so a crash
        // mid-phase leaves an accurate progress value behind.
        let mut progress = PROGRESS_PLANNED;
        for phase in &MIGRATION_PHASES {
            self.store.append_log(job_id, phase.label).await?;
            let _ = self.event_tx.send(EngineEvent::PhaseStarted {
                job_id,
                phase: phase.label,
            });
            tracing::debug!(job_id, phase = phase.label, target = phase.target, "Phase started");

            while progress < phase.target {
                tokio::time::sleep(self.pacing.delay).await;
                progress = (progress + self.pacing.step).min(phase.target);
                self.persist_progress(job_id, progress).await?;
            }
        }

        self.store
            .append_log(
                job_id,
                "Migration workflow completed (manual data transfer steps may still be required).",
            )
            .await?;
        self.store
            .update_job(job_id, JobUpdate::status(JobStatus::Completed))
            .await?;
        tracing::info!(job_id, target_node = %target_node, "Migration job completed");

        Ok(MigrationOutcome {
            job_id,
            vm_name: job.vm_name,
            target_node,
        })
    }

    /// Persist a progress value and notify subscribers.
    async fn persist_progress(&self, job_id: DbId, percent: i16) -> Result<(), StoreError> {
        self.store
            .update_job(job_id, JobUpdate::progress(percent))
            .await?;
        let _ = self.event_tx.send(EngineEvent::Progress { job_id, percent });
        Ok(())
    }

    /// Reflect a run failure into job state, best effort.
    ///
    /// Skipped entirely when no job row exists. Store errors here are
    /// logged and swallowed: the original failure is what propagates.
    async fn mark_failed(&self, job_id: DbId, err: &EngineError) {
        if matches!(err, EngineError::JobNotFound(_)) {
            return;
        }
        match self.store.get_job(job_id).await {
            Ok(Some(job)) => {
                if !job.is_terminal() {
                    if let Err(e) = self
                        .store
                        .update_job(job_id, JobUpdate::status(JobStatus::Failed))
                        .await
                    {
                        tracing::error!(job_id, error = %e, "Failed to mark job as failed");
                    }
                }
                let entry = format!("Failed: {}: {err}", err.kind());
                if let Err(e) = self.store.append_log(job_id, &entry).await {
                    tracing::error!(job_id, error = %e, "Failed to append failure log entry");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(job_id, error = %e, "Failed to reload job while recording failure");
            }
        }
    }
}

/// Per-call connection parameters from a provider row.
///
/// Credentials pass straight through; the engine stores nothing.
fn endpoint_for(provider: &Provider) -> ProviderEndpoint {
    ProviderEndpoint {
        api_url: provider.api_url.clone(),
        username: provider.username.clone().unwrap_or_default(),
        secret: provider.secret.clone().unwrap_or_default(),
        verify_tls: provider.verify_tls,
    }
}
