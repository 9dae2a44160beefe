//! Append-only job log entries.

use serde::Serialize;
use sqlx::FromRow;
use vmshift_core::types::{DbId, Timestamp};

/// A row from the `job_logs` table.
///
/// Entries are immutable once written; `id` is the ordering key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobLogEntry {
    pub id: DbId,
    pub job_id: DbId,
    pub message: String,
    pub created_at: Timestamp,
}
