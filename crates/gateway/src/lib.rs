//! Provider gateway: connectivity and inventory access for the two
//! platform kinds the migration engine talks to.
//!
//! The engine consumes only the [`ProviderGateway`] trait; the production
//! implementation ([`HttpProviderGateway`]) drives the vCenter and Proxmox
//! REST clients with a bounded per-request timeout. Tests substitute their
//! own implementations.

pub mod error;
pub mod proxmox;
pub mod types;
pub mod vcenter;

use std::time::Duration;

use async_trait::async_trait;

pub use error::ConnectivityError;
pub use types::{ProviderEndpoint, SourceInventory, SourceVmSummary, TargetNode};

use proxmox::ProxmoxClient;
use vcenter::VSphereClient;

/// Default bound on any single gateway request.
///
/// Connectivity checks must fail within a known window instead of hanging
/// on a dead endpoint.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Capabilities the migration engine needs from provider endpoints.
///
/// Both calls are synchronous from the orchestrator's point of view and
/// may block for a network round trip (bounded by the implementation's
/// timeout). Credentials travel inside [`ProviderEndpoint`], per call.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Fetch a read-only inventory snapshot from the source platform.
    async fn fetch_source_inventory(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<SourceInventory, ConnectivityError>;

    /// Fetch the ordered list of candidate execution targets from the
    /// destination cluster.
    async fn fetch_destination_targets(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<Vec<TargetNode>, ConnectivityError>;
}

/// Production gateway backed by the REST clients.
pub struct HttpProviderGateway {
    timeout: Duration,
}

impl HttpProviderGateway {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout (mainly for tests and slow labs).
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn fetch_source_inventory(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<SourceInventory, ConnectivityError> {
        let client = VSphereClient::new(endpoint, self.timeout)?;
        tracing::debug!(endpoint = %client.endpoint(), "Fetching vCenter inventory");
        client
            .fetch_inventory(&endpoint.username, &endpoint.secret)
            .await
    }

    async fn fetch_destination_targets(
        &self,
        endpoint: &ProviderEndpoint,
    ) -> Result<Vec<TargetNode>, ConnectivityError> {
        let client = ProxmoxClient::new(endpoint, self.timeout)?;
        tracing::debug!(endpoint = %client.endpoint(), "Fetching Proxmox nodes");
        client
            .fetch_nodes(&endpoint.username, &endpoint.secret)
            .await
    }
}
