//! The job store contract.
//!
//! The engine never touches a database handle directly; everything it
//! persists goes through [`JobStore`]. A systems deployment backs it with
//! [`PgStore`] (row-level atomic updates); tests and ad-hoc tooling use
//! [`MemoryStore`]. Both enforce the terminal-state invariant: once a job
//! is `completed` or `failed`, `update_job` refuses further mutation.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use vmshift_core::types::DbId;
use vmshift_db::models::{Job, JobLogEntry, JobStatus, Provider, VirtualMachine};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Errors surfaced by job store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Job {0} not found")]
    JobNotFound(DbId),

    /// The write targeted a completed/failed job and was refused.
    #[error("Job {0} is in a terminal state")]
    TerminalState(DbId),
}

/// Partial change set applied to a job row as one atomic write.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub progress: Option<i16>,
    pub target_node: Option<String>,
}

impl JobUpdate {
    /// Change only the status.
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Change only the progress percentage.
    pub fn progress(progress: i16) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    /// Change only the target node.
    pub fn target_node(node: impl Into<String>) -> Self {
        Self {
            target_node: Some(node.into()),
            ..Default::default()
        }
    }

    /// Also set the progress percentage.
    pub fn with_progress(mut self, progress: i16) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Durable record of job identity, status, progress, and phase log, plus
/// the provider/VM context lookups the orchestrator needs.
///
/// Every write is atomic per call; readers never observe a torn
/// status/progress pair.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: DbId) -> Result<Option<Job>, StoreError>;

    /// Apply a partial update atomically. Fails with
    /// [`StoreError::TerminalState`] when the job is already
    /// completed/failed, [`StoreError::JobNotFound`] when no row exists.
    async fn update_job(&self, id: DbId, update: JobUpdate) -> Result<(), StoreError>;

    /// Append one immutable entry to the job's log trail.
    async fn append_log(&self, job_id: DbId, message: &str) -> Result<JobLogEntry, StoreError>;

    /// Read log entries with id greater than `after`, oldest first.
    async fn list_logs_after(
        &self,
        job_id: DbId,
        after: DbId,
    ) -> Result<Vec<JobLogEntry>, StoreError>;

    async fn find_provider(&self, id: DbId) -> Result<Option<Provider>, StoreError>;

    async fn find_vm(&self, id: DbId) -> Result<Option<VirtualMachine>, StoreError>;
}
