//! Discovered source virtual machine rows.

use serde::Serialize;
use sqlx::FromRow;
use vmshift_core::types::{DbId, Timestamp};

/// A row from the `virtual_machines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VirtualMachine {
    pub id: DbId,
    pub provider_id: DbId,
    pub name: String,
    /// Provider-side object id (vCenter moid).
    pub source_identifier: String,
    pub power_state: Option<String>,
    pub cpu_count: Option<i32>,
    pub memory_bytes: Option<i64>,
    pub storage_gb: Option<f64>,
    pub guest_os: Option<String>,
    pub created_at: Timestamp,
}

/// Upsert payload produced from a live inventory snapshot.
#[derive(Debug, Clone)]
pub struct DiscoveredVm {
    pub name: String,
    pub source_identifier: String,
    pub power_state: Option<String>,
    pub cpu_count: Option<i32>,
    pub memory_bytes: Option<i64>,
}
