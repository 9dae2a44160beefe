//! In-memory job store.
//!
//! A single `tokio::sync::Mutex` around the whole table set gives the
//! same per-write atomicity the SQL store gets from single-statement
//! updates. Used by the engine test suite and ad-hoc tooling; not meant
//! for production.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use vmshift_core::types::DbId;
use vmshift_db::models::{
    Job, JobLogEntry, JobStatus, Provider, ProviderKind, VirtualMachine,
};

use super::{JobStore, JobUpdate, StoreError};

#[derive(Default)]
struct MemoryInner {
    jobs: HashMap<DbId, Job>,
    logs: Vec<JobLogEntry>,
    providers: HashMap<DbId, Provider>,
    vms: HashMap<DbId, VirtualMachine>,
    next_job_id: DbId,
    next_log_id: DbId,
    next_provider_id: DbId,
    next_vm_id: DbId,
}

/// In-memory [`JobStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a queued job, returning the stored row.
    pub async fn insert_job(
        &self,
        vm_name: &str,
        source_provider_id: Option<DbId>,
        destination_provider_id: Option<DbId>,
        source_vm_id: Option<DbId>,
        target_node: Option<&str>,
    ) -> Job {
        let mut inner = self.inner.lock().await;
        inner.next_job_id += 1;
        let now = Utc::now();
        let job = Job {
            id: inner.next_job_id,
            vm_name: vm_name.to_string(),
            status_id: JobStatus::Queued.id(),
            progress: 0,
            source_provider_id,
            destination_provider_id,
            source_vm_id,
            target_node: target_node.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        inner.jobs.insert(job.id, job.clone());
        job
    }

    /// Seed a provider row of the given kind.
    pub async fn insert_provider(&self, name: &str, kind: ProviderKind, api_url: &str) -> Provider {
        let mut inner = self.inner.lock().await;
        inner.next_provider_id += 1;
        let provider = Provider {
            id: inner.next_provider_id,
            name: name.to_string(),
            kind_id: kind.id(),
            api_url: api_url.to_string(),
            username: Some("svc-migrator".to_string()),
            secret: Some("secret".to_string()),
            verify_tls: true,
            created_at: Utc::now(),
        };
        inner.providers.insert(provider.id, provider.clone());
        provider
    }

    /// Seed a discovered VM row.
    pub async fn insert_vm(
        &self,
        provider_id: DbId,
        name: &str,
        source_identifier: &str,
    ) -> VirtualMachine {
        let mut inner = self.inner.lock().await;
        inner.next_vm_id += 1;
        let vm = VirtualMachine {
            id: inner.next_vm_id,
            provider_id,
            name: name.to_string(),
            source_identifier: source_identifier.to_string(),
            power_state: Some("POWERED_ON".to_string()),
            cpu_count: Some(2),
            memory_bytes: Some(4 * 1024 * 1024 * 1024),
            storage_gb: Some(40.0),
            guest_os: None,
            created_at: Utc::now(),
        };
        inner.vms.insert(vm.id, vm.clone());
        vm
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_job(&self, id: DbId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.lock().await.jobs.get(&id).cloned())
    }

    async fn update_job(&self, id: DbId, update: JobUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let job = inner.jobs.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;

        if job.is_terminal() {
            return Err(StoreError::TerminalState(id));
        }

        if let Some(status) = update.status {
            job.status_id = status.id();
        }
        if let Some(progress) = update.progress {
            job.progress = progress;
        }
        if let Some(target_node) = update.target_node {
            job.target_node = Some(target_node);
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn append_log(&self, job_id: DbId, message: &str) -> Result<JobLogEntry, StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.jobs.contains_key(&job_id) {
            return Err(StoreError::JobNotFound(job_id));
        }
        inner.next_log_id += 1;
        let entry = JobLogEntry {
            id: inner.next_log_id,
            job_id,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        inner.logs.push(entry.clone());
        Ok(entry)
    }

    async fn list_logs_after(
        &self,
        job_id: DbId,
        after: DbId,
    ) -> Result<Vec<JobLogEntry>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .logs
            .iter()
            .filter(|entry| entry.job_id == job_id && entry.id > after)
            .cloned()
            .collect())
    }

    async fn find_provider(&self, id: DbId) -> Result<Option<Provider>, StoreError> {
        Ok(self.inner.lock().await.providers.get(&id).cloned())
    }

    async fn find_vm(&self, id: DbId) -> Result<Option<VirtualMachine>, StoreError> {
        Ok(self.inner.lock().await.vms.get(&id).cloned())
    }
}
