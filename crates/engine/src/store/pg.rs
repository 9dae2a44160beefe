//! PostgreSQL-backed job store.
//!
//! Thin adapter over the `vmshift-db` repositories. The terminal-state
//! guard lives in the repository SQL (`WHERE status_id NOT IN (...)`), so
//! concurrent writers cannot resurrect a finished job regardless of
//! interleaving.

use async_trait::async_trait;
use sqlx::PgPool;
use vmshift_core::types::DbId;
use vmshift_db::models::{Job, JobLogEntry, Provider, VirtualMachine};
use vmshift_db::repositories::{JobLogRepo, JobRepo, ProviderRepo, VmRepo};

use super::{JobStore, JobUpdate, StoreError};

/// Job store over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn get_job(&self, id: DbId) -> Result<Option<Job>, StoreError> {
        Ok(JobRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_job(&self, id: DbId, update: JobUpdate) -> Result<(), StoreError> {
        let updated = JobRepo::apply_update(
            &self.pool,
            id,
            update.status,
            update.progress,
            update.target_node.as_deref(),
        )
        .await?;

        if updated {
            return Ok(());
        }

        // Nothing was touched: distinguish "no such job" from "terminal".
        match JobRepo::find_by_id(&self.pool, id).await? {
            Some(_) => Err(StoreError::TerminalState(id)),
            None => Err(StoreError::JobNotFound(id)),
        }
    }

    async fn append_log(&self, job_id: DbId, message: &str) -> Result<JobLogEntry, StoreError> {
        Ok(JobLogRepo::append(&self.pool, job_id, message).await?)
    }

    async fn list_logs_after(
        &self,
        job_id: DbId,
        after: DbId,
    ) -> Result<Vec<JobLogEntry>, StoreError> {
        Ok(JobLogRepo::list_after(&self.pool, job_id, after).await?)
    }

    async fn find_provider(&self, id: DbId) -> Result<Option<Provider>, StoreError> {
        Ok(ProviderRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_vm(&self, id: DbId) -> Result<Option<VirtualMachine>, StoreError> {
        Ok(VmRepo::find_by_id(&self.pool, id).await?)
    }
}
