//! Shared harness for engine integration tests: an in-memory store plus
//! a scriptable gateway whose outcomes each test controls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vmshift_db::models::{Job, ProviderKind};
use vmshift_engine::orchestrator::{MigrationOrchestrator, PacingConfig};
use vmshift_engine::store::{JobStore, MemoryStore};
use vmshift_gateway::{
    ConnectivityError, ProviderEndpoint, ProviderGateway, SourceInventory, SourceVmSummary,
    TargetNode,
};

/// Pacing that keeps a full run in the low milliseconds.
pub const FAST_PACING: PacingConfig = PacingConfig {
    step: 5,
    delay: Duration::from_millis(1),
};

/// Gateway whose connectivity outcomes are fixed per test.
pub struct ScriptedGateway {
    pub source_reachable: bool,
    pub dest_reachable: bool,
    pub target_names: Vec<&'static str>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            source_reachable: true,
            dest_reachable: true,
            target_names: vec!["node-a"],
        }
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    async fn fetch_source_inventory(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<SourceInventory, ConnectivityError> {
        if !self.source_reachable {
            return Err(ConnectivityError::Unreachable {
                endpoint: endpoint.api_url.clone(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(SourceInventory {
            vms: vec![SourceVmSummary {
                name: "db-01".to_string(),
                moid: "vm-1042".to_string(),
                power_state: Some("POWERED_ON".to_string()),
                cpu_count: Some(4),
                memory_mib: Some(8192),
            }],
        })
    }

    async fn fetch_destination_targets(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<Vec<TargetNode>, ConnectivityError> {
        if !self.dest_reachable {
            return Err(ConnectivityError::Unreachable {
                endpoint: endpoint.api_url.clone(),
                detail: "connection refused".to_string(),
            });
        }
        Ok(self
            .target_names
            .iter()
            .map(|name| TargetNode {
                name: name.to_string(),
                status: Some("online".to_string()),
                cpu_usage: Some(0.05),
                memory_usage: Some(1024),
            })
            .collect())
    }
}

/// Store + orchestrator pair wired over the scripted gateway.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub orchestrator: MigrationOrchestrator,
}

pub fn harness(gateway: ScriptedGateway) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = MigrationOrchestrator::new(
        Arc::clone(&store) as Arc<dyn JobStore>,
        Arc::new(gateway),
    )
    .with_pacing(FAST_PACING);
    Harness {
        store,
        orchestrator,
    }
}

/// Seed a vCenter source, a Proxmox destination, a discovered VM, and a
/// queued job referencing all three.
pub async fn seed_ready_job(store: &MemoryStore, target_node: Option<&str>) -> Job {
    let source = store
        .insert_provider("lab vcenter", ProviderKind::Vcenter, "vcenter.lab.local")
        .await;
    let dest = store
        .insert_provider("lab proxmox", ProviderKind::Proxmox, "pve.lab.local")
        .await;
    let vm = store.insert_vm(source.id, "db-01", "vm-1042").await;

    store
        .insert_job("db-01", Some(source.id), Some(dest.id), Some(vm.id), target_node)
        .await
}

/// The log trail a successful run writes, in order.
pub fn expected_success_log(target: &str) -> Vec<String> {
    vec![
        "Starting migration workflow.".to_string(),
        "Connectivity to vCenter source confirmed (1 VMs visible).".to_string(),
        "Connectivity to Proxmox destination confirmed (1 candidate nodes).".to_string(),
        format!("Prepared migration plan for VM 'db-01' (source id vm-1042) to Proxmox node '{target}'."),
        "Export VM from vCenter as OVA".to_string(),
        "Convert disks to qcow2 using qemu-img".to_string(),
        "Upload converted disks to Proxmox storage".to_string(),
        "Provision Proxmox VM and attach disks".to_string(),
        "Initiate Proxmox live migration".to_string(),
        "Migration workflow completed (manual data transfer steps may still be required).".to_string(),
    ]
}
