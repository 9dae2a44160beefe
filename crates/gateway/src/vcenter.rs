//! REST client for the vCenter source platform.
//!
//! Uses the vSphere Automation REST API: a session token is created with
//! basic auth (`POST /rest/com/vmware/cis/session`), used for the
//! inventory read, and deleted on the way out (best effort).

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConnectivityError;
use crate::types::{ProviderEndpoint, SourceInventory, SourceVmSummary};

/// Default HTTPS port when the operator pasted a bare hostname.
const DEFAULT_PORT: u16 = 443;

/// Header carrying the session token on authenticated requests.
const SESSION_HEADER: &str = "vmware-api-session-id";

/// Envelope used by the vSphere REST API (`{"value": ...}`).
#[derive(Debug, Deserialize)]
struct ValueEnvelope<T> {
    value: T,
}

/// One VM summary row from `GET /rest/vcenter/vm`.
#[derive(Debug, Deserialize)]
struct VmSummaryPayload {
    vm: String,
    name: String,
    power_state: Option<String>,
    cpu_count: Option<i32>,
    #[serde(rename = "memory_size_MiB")]
    memory_size_mib: Option<i64>,
}

/// HTTP client bound to one vCenter endpoint.
pub struct VSphereClient {
    http: reqwest::Client,
    base: Url,
    timeout_secs: u64,
}

impl VSphereClient {
    /// Build a client for the given endpoint.
    ///
    /// Accepts a bare host, `host:port`, or a full URL; everything is
    /// normalized to `https://host:port`.
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

    /// Collect the VM inventory visible to the given credentials.
    pub async fn fetch_inventory(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SourceInventory, ConnectivityError> {
        let session = self.create_session(username, password).await?;

        let result = self.list_vms(&session).await;

        // Session teardown failures are not interesting to callers.
        if let Err(e) = self.delete_session(&session).await {
            tracing::debug!(endpoint = %self.base, error = %e, "vCenter session teardown failed");
        }

        result
    }

    async fn create_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, ConnectivityError> {
        let url = self.rest_url("rest/com/vmware/cis/session");
        let response = self
            .http
            .post(url)
            .basic_auth(username, Some(password))
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
                detail: format!("session create returned HTTP {}", response.status()),
            });
        }

        let envelope: ValueEnvelope<String> = response
            .json()
            .await
            .map_err(|e| ConnectivityError::from_request(self.endpoint(), self.timeout_secs, e))?;
        Ok(envelope.value)
    }

    async fn list_vms(&self, session: &str) -> Result<SourceInventory, ConnectivityError> {
        let url = self.rest_url("rest/vcenter/vm");
        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, session)
            .send()
            .await
            .map_err(|e| ConnectivityError::from_request(self.endpoint(), self.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(ConnectivityError::Protocol {
                endpoint: self.endpoint().to_string(),
                detail: format!("VM listing returned HTTP {}", response.status()),
            });
        }

        let envelope: ValueEnvelope<Vec<VmSummaryPayload>> = response
            .json()
            .await
            .map_err(|e| ConnectivityError::from_request(self.endpoint(), self.timeout_secs, e))?;

        Ok(SourceInventory {
            vms: envelope.value.into_iter().map(into_summary).collect(),
        })
    }

    async fn delete_session(&self, session: &str) -> Result<(), reqwest::Error> {
        let url = self.rest_url("rest/com/vmware/cis/session");
        self.http
            .delete(url)
            .header(SESSION_HEADER, session)
            .send()
            .await?;
        Ok(())
    }

    fn rest_url(&self, path: &str) -> Url {
        // base always ends in "/" after normalization, and path is a
        // known-good relative literal.
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}

fn into_summary(payload: VmSummaryPayload) -> SourceVmSummary {
    SourceVmSummary {
        name: payload.name,
        moid: payload.vm,
        power_state: payload.power_state,
        cpu_count: payload.cpu_count,
        memory_mib: payload.memory_size_mib,
    }
}

/// Normalize an operator-supplied URL to `https://host:port/`.
///
/// Operators paste anything from a bare hostname to a full SDK URL with a
/// path; only the host and port survive.
pub(crate) fn normalize_base_url(
    api_url: &str,
    default_port: u16,
) -> Result<Url, ConnectivityError> {
    let candidate = if api_url.contains("://") {
        api_url.to_string()
    } else {
        format!("https://{api_url}")
    };

    let parsed = Url::parse(&candidate).map_err(|e| ConnectivityError::InvalidUrl {
        url: api_url.to_string(),
        detail: e.to_string(),
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| ConnectivityError::InvalidUrl {
            url: api_url.to_string(),
            detail: "missing hostname".to_string(),
        })?;
    let port = parsed.port().unwrap_or(default_port);

    Url::parse(&format!("https://{host}:{port}/")).map_err(|e| ConnectivityError::InvalidUrl {
        url: api_url.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hostname_gets_https_and_default_port() {
        let url = normalize_base_url("vcenter.lab.local", 443).unwrap();
        assert_eq!(url.as_str(), "https://vcenter.lab.local:443/");
    }

    #[test]
    fn full_url_keeps_host_and_port_but_drops_path() {
        let url = normalize_base_url("https://vcenter.lab.local:9443/sdk", 443).unwrap();
        assert_eq!(url.as_str(), "https://vcenter.lab.local:9443/");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(normalize_base_url("", 443).is_err());
    }

    #[test]
    fn vm_listing_payload_deserializes() {
        let body = r#"{"value":[
            {"vm":"vm-1042","name":"db-01","power_state":"POWERED_ON",
             "cpu_count":4,"memory_size_MiB":8192},
            {"vm":"vm-7","name":"legacy","power_state":null,
             "cpu_count":null,"memory_size_MiB":null}
        ]}"#;
        let envelope: ValueEnvelope<Vec<VmSummaryPayload>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.value.len(), 2);

        let summary = into_summary(envelope.value.into_iter().next().unwrap());
        assert_eq!(summary.moid, "vm-1042");
        assert_eq!(summary.name, "db-01");
        assert_eq!(summary.memory_mib, Some(8192));
    }

    #[test]
    fn session_payload_deserializes() {
        let envelope: ValueEnvelope<String> =
            serde_json::from_str(r#"{"value":"abc123"}"#).unwrap();
        assert_eq!(envelope.value, "abc123");
    }
}
