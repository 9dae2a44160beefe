//! Repository for the `jobs` table.
//!
//! Uses `JobStatus` from `models::status` for all status transitions.
//! Every write that could touch a terminal job carries the terminal-state
//! guard in its WHERE clause, so the "no mutation after completed/failed"
//! invariant holds at the SQL level regardless of caller interleaving.

use sqlx::PgPool;
use vmshift_core::types::DbId;

use crate::models::job::{Job, JobListQuery, NewJob};
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, vm_name, status_id, progress, \
    source_provider_id, destination_provider_id, source_vm_id, \
    target_node, created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for migration jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new queued job. Returns the inserted row.
    pub async fn create(
        pool: &PgPool,
        vm_name: &str,
        input: &NewJob,
    ) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs \
                 (vm_name, status_id, progress, source_provider_id, \
                  destination_provider_id, source_vm_id, target_node) \
             VALUES ($1, $2, 0, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(vm_name)
            .bind(JobStatus::Queued.id())
            .bind(input.source_provider_id)
            .bind(input.destination_provider_id)
            .bind(input.source_vm_id)
            .bind(&input.target_node)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update (status and/or progress and/or target node)
    /// as one atomic statement.
    ///
    /// Returns `false` when no row was touched -- the job either does not
    /// exist or is already in a terminal state (the WHERE clause refuses
    /// writes to completed/failed rows).
    pub async fn apply_update(
        pool: &PgPool,
        id: DbId,
        status: Option<JobStatus>,
        progress: Option<i16>,
        target_node: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = COALESCE($2, status_id), \
                 progress = COALESCE($3, progress), \
                 target_node = COALESCE($4, target_node), \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($5, $6)",
        )
        .bind(id)
        .bind(status.map(JobStatus::id))
        .bind(progress)
        .bind(target_node)
        .bind(JobStatus::Completed.id())
        .bind(JobStatus::Failed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List jobs, newest first, with optional status filter and pagination.
    pub async fn list(pool: &PgPool, params: &JobListQuery) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query);

        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}
