//! Migration job row and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vmshift_core::types::{DbId, Timestamp};

use super::status::{JobStatus, StatusId};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    /// Display name of the VM being migrated, captured at creation time.
    pub vm_name: String,
    pub status_id: StatusId,
    /// Integer percentage in `[0, 100]`, monotonically non-decreasing
    /// within a run.
    pub progress: i16,
    pub source_provider_id: Option<DbId>,
    pub destination_provider_id: Option<DbId>,
    pub source_vm_id: Option<DbId>,
    /// Destination node; may be filled in during execution (planning step).
    pub target_node: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Decoded status. Unknown ids (schema drift) read as `Failed` so
    /// callers never treat a corrupt row as runnable.
    pub fn status(&self) -> JobStatus {
        JobStatus::from_id(self.status_id).unwrap_or(JobStatus::Failed)
    }

    /// True once the job reached `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        JobStatus::is_terminal_id(self.status_id)
    }
}

/// DTO for submitting a new migration job via `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub source_provider_id: DbId,
    pub destination_provider_id: DbId,
    pub source_vm_id: DbId,
    /// Optional pre-selected destination node; when absent the engine
    /// picks the first candidate the destination cluster reports.
    pub target_node: Option<String>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    /// Filter by status ID (e.g. 2 = running, 4 = failed).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
