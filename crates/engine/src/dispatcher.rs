//! Job dispatcher: hands submitted job ids to worker slots.
//!
//! Guarantees at most one active execution per job id via an in-memory
//! claim set, and bounds total parallelism with a semaphore. A second
//! submission for an in-flight id is **rejected** (not coalesced) with
//! [`DispatchError::AlreadyActive`]; queue saturation is reported
//! synchronously as [`DispatchError::Saturated`]. Failures *during*
//! execution are never reported here -- they land in job state and on the
//! orchestrator's event channel.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use vmshift_core::types::DbId;

use crate::orchestrator::MigrationOrchestrator;

/// Default number of concurrently executing jobs.
pub const DEFAULT_WORKER_SLOTS: usize = 4;

/// Synchronous dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The job id already has an active execution.
    #[error("Job {0} is already executing")]
    AlreadyActive(DbId),

    /// Every worker slot is busy; re-submit once one frees up.
    #[error("All {0} worker slots are busy")]
    Saturated(usize),
}

/// Accepts job ids and runs each on its own tokio task.
pub struct JobDispatcher {
    orchestrator: Arc<MigrationOrchestrator>,
    active: Arc<Mutex<HashSet<DbId>>>,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl JobDispatcher {
    pub fn new(orchestrator: Arc<MigrationOrchestrator>, worker_slots: usize) -> Self {
        Self {
            orchestrator,
            active: Arc::new(Mutex::new(HashSet::new())),
            slots: Arc::new(Semaphore::new(worker_slots)),
            capacity: worker_slots,
        }
    }

    /// Enqueue execution of a job. Returns as soon as the job is claimed;
    /// the caller does not block on phase completion.
    pub async fn submit(&self, job_id: DbId) -> Result<(), DispatchError> {
        let permit = Arc::clone(&self.slots)
            .try_acquire_owned()
            .map_err(|_| DispatchError::Saturated(self.capacity))?;

        {
            let mut active = self.active.lock().await;
            if !active.insert(job_id) {
                // Permit is released on drop; the claim stays with the
                // first submission.
                return Err(DispatchError::AlreadyActive(job_id));
            }
        }

        tracing::info!(job_id, "Job dispatched to worker slot");

        let orchestrator = Arc::clone(&self.orchestrator);
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            // Hold the slot for the whole run.
            let _permit = permit;

            // Outcome is recorded in job state and broadcast by the
            // orchestrator; nothing to propagate from this task.
            let result = orchestrator.execute(job_id).await;
            if result.is_ok() {
                tracing::debug!(job_id, "Worker slot released after completion");
            } else {
                tracing::debug!(job_id, "Worker slot released after failure");
            }

            active.lock().await.remove(&job_id);
        });

        Ok(())
    }

    /// Number of executions currently holding a claim.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}
