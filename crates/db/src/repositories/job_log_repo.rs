//! Repository for the `job_logs` table.

use sqlx::PgPool;
use vmshift_core::types::DbId;

use crate::models::job_log::JobLogEntry;

/// Column list for `job_logs` queries.
const COLUMNS: &str = "id, job_id, message, created_at";

/// Append and read operations for the per-job log trail.
pub struct JobLogRepo;

impl JobLogRepo {
    /// Append an entry to a job's log trail. Entries are immutable once
    /// written.
    pub async fn append(
        pool: &PgPool,
        job_id: DbId,
        message: &str,
    ) -> Result<JobLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_logs (job_id, message) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobLogEntry>(&query)
            .bind(job_id)
            .bind(message)
            .fetch_one(pool)
            .await
    }

    /// Return every entry with id greater than `after`, oldest first.
    ///
    /// `after = 0` returns the full trail; subscribers pass their
    /// last-seen id to receive only new entries.
    pub async fn list_after(
        pool: &PgPool,
        job_id: DbId,
        after: DbId,
    ) -> Result<Vec<JobLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM job_logs \
             WHERE job_id = $1 AND id > $2 \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, JobLogEntry>(&query)
            .bind(job_id)
            .bind(after)
            .fetch_all(pool)
            .await
    }
}
