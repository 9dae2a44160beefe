//! Wire-facing types shared by both provider connectors.

use serde::Serialize;

/// Per-call connection parameters for one provider endpoint.
///
/// Built fresh from the provider row for every gateway call; credentials
/// are never retained by the engine.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub api_url: String,
    pub username: String,
    pub secret: String,
    pub verify_tls: bool,
}

/// One VM as reported by the source platform inventory.
#[derive(Debug, Clone, Serialize)]
pub struct SourceVmSummary {
    pub name: String,
    /// Provider-side object id (vCenter moid, e.g. `vm-1042`).
    pub moid: String,
    pub power_state: Option<String>,
    pub cpu_count: Option<i32>,
    pub memory_mib: Option<i64>,
}

/// Read-only snapshot of the source platform inventory.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInventory {
    pub vms: Vec<SourceVmSummary>,
}

/// One candidate execution target on the destination cluster.
#[derive(Debug, Clone, Serialize)]
pub struct TargetNode {
    pub name: String,
    pub status: Option<String>,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<i64>,
}
