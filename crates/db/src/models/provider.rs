//! Registered virtualization provider rows and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vmshift_core::types::{DbId, Timestamp};

use super::status::{ProviderKind, StatusId};

/// A row from the `providers` table.
///
/// `secret` is never serialized outward; it is passed through to the
/// gateway per call.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Provider {
    pub id: DbId,
    pub name: String,
    pub kind_id: StatusId,
    pub api_url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub verify_tls: bool,
    pub created_at: Timestamp,
}

impl Provider {
    /// Decoded platform kind, if the row carries a known id.
    pub fn kind(&self) -> Option<ProviderKind> {
        ProviderKind::from_id(self.kind_id)
    }
}

/// DTO for registering a provider via `POST /api/v1/providers`.
#[derive(Debug, Deserialize)]
pub struct NewProvider {
    pub name: String,
    /// Wire name of the platform kind: `"vcenter"` or `"proxmox"`.
    pub kind: String,
    pub api_url: String,
    pub username: Option<String>,
    pub secret: Option<String>,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}
