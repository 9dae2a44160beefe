//! REST client for the Proxmox VE destination cluster.
//!
//! Authenticates with an API token (`Authorization: PVEAPIToken=...`);
//! the stored username carries the `user@realm!tokenid` part and the
//! stored secret the token value.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConnectivityError;
use crate::types::{ProviderEndpoint, TargetNode};
use crate::vcenter::normalize_base_url;

/// Default Proxmox API port when the operator pasted a bare hostname.
const DEFAULT_PORT: u16 = 8006;

/// Envelope used by the Proxmox API (`{"data": ...}`).
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// One node row from `GET /api2/json/nodes`.
#[derive(Debug, Deserialize)]
struct NodePayload {
    node: String,
    status: Option<String>,
    cpu: Option<f64>,
    mem: Option<i64>,
}

/// HTTP client bound to one Proxmox cluster endpoint.
pub struct ProxmoxClient {
    http: reqwest::Client,
    base: Url,
    timeout_secs: u64,
}

impl ProxmoxClient {
    /// Build a client for the given endpoint (see
    /// [`VSphereClient::new`](crate::vcenter::VSphereClient::new) for URL
    /// normalization rules; the default port here is 8006).
    pub fn new(endpoint: &ProviderEndpoint, timeout: Duration) -> Result<Self, ConnectivityError> {
        let base = normalize_base_url(&endpoint.api_url, DEFAULT_PORT)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!endpoint.verify_tls)
            .build()
            .map_err(|e| ConnectivityError::Protocol {
                endpoint: base.to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            http,
            base,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Endpoint this client talks to (scheme://host:port).
    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    /// List cluster nodes, in the order the cluster reports them.
    pub async fn fetch_nodes(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<Vec<TargetNode>, ConnectivityError> {
        let url = self
            .base
            .join("api2/json/nodes")
            .unwrap_or_else(|_| self.base.clone());

        let response = self
            .http
            .get(url)
            .header("Authorization", api_token_header(username, secret))
            .send()
            .await
            .map_err(|e| ConnectivityError::from_request(self.endpoint(), self.timeout_secs, e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ConnectivityError::AuthRejected {
                endpoint: self.endpoint().to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ConnectivityError::Protocol {
                endpoint: self.endpoint().to_string(),
                detail: format!("node listing returned HTTP {}", response.status()),
            });
        }

        let envelope: DataEnvelope<Vec<NodePayload>> = response
            .json()
            .await
            .map_err(|e| ConnectivityError::from_request(self.endpoint(), self.timeout_secs, e))?;

        Ok(envelope
            .data
            .into_iter()
            .map(|n| TargetNode {
                name: n.node,
                status: n.status,
                cpu_usage: n.cpu,
                memory_usage: n.mem,
            })
            .collect())
    }
}

/// Build the `PVEAPIToken` authorization header value.
fn api_token_header(username: &str, secret: &str) -> String {
    format!("PVEAPIToken={username}={secret}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_header_joins_user_and_secret() {
        assert_eq!(
            api_token_header("migrator@pve!ci", "f00d-beef"),
            "PVEAPIToken=migrator@pve!ci=f00d-beef"
        );
    }

    #[test]
    fn node_listing_payload_deserializes_in_order() {
        let body = r#"{"data":[
            {"node":"node-a","status":"online","cpu":0.04,"mem":20480},
            {"node":"node-b","status":"offline","cpu":null,"mem":null}
        ]}"#;
        let envelope: DataEnvelope<Vec<NodePayload>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.data[0].node, "node-a");
        assert_eq!(envelope.data[1].status.as_deref(), Some("offline"));
    }

    #[test]
    fn bare_hostname_uses_proxmox_port() {
        let url = normalize_base_url("pve.lab.local", DEFAULT_PORT).unwrap();
        assert_eq!(url.as_str(), "https://pve.lab.local:8006/");
    }
}
