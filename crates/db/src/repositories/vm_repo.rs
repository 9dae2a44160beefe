//! Repository for the `virtual_machines` table.

use sqlx::PgPool;
use vmshift_core::types::DbId;

use crate::models::virtual_machine::{DiscoveredVm, VirtualMachine};

/// Column list for `virtual_machines` queries.
const COLUMNS: &str = "\
    id, provider_id, name, source_identifier, power_state, \
    cpu_count, memory_bytes, storage_gb, guest_os, created_at";

/// Query and upsert operations for discovered source VMs.
pub struct VmRepo;

impl VmRepo {
    /// Find a VM by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VirtualMachine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM virtual_machines WHERE id = $1");
        sqlx::query_as::<_, VirtualMachine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the VMs discovered on one provider, by name.
    pub async fn list_by_provider(
        pool: &PgPool,
        provider_id: DbId,
    ) -> Result<Vec<VirtualMachine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM virtual_machines \
             WHERE provider_id = $1 \
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, VirtualMachine>(&query)
            .bind(provider_id)
            .fetch_all(pool)
            .await
    }

    /// Upsert one discovered VM keyed on `(provider_id, source_identifier)`,
    /// refreshing the mutable snapshot fields on conflict.
    pub async fn upsert_discovered(
        pool: &PgPool,
        provider_id: DbId,
        vm: &DiscoveredVm,
    ) -> Result<VirtualMachine, sqlx::Error> {
        let query = format!(
            "INSERT INTO virtual_machines \
                 (provider_id, name, source_identifier, power_state, cpu_count, memory_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (provider_id, source_identifier) DO UPDATE \
             SET name = EXCLUDED.name, \
                 power_state = EXCLUDED.power_state, \
                 cpu_count = EXCLUDED.cpu_count, \
                 memory_bytes = EXCLUDED.memory_bytes \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VirtualMachine>(&query)
            .bind(provider_id)
            .bind(&vm.name)
            .bind(&vm.source_identifier)
            .bind(&vm.power_state)
            .bind(vm.cpu_count)
            .bind(vm.memory_bytes)
            .fetch_one(pool)
            .await
    }
}
