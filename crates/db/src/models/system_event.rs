//! Operator-facing system event rows.

use serde::Serialize;
use sqlx::FromRow;
use vmshift_core::types::{DbId, Timestamp};

/// A row from the `system_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemEvent {
    pub id: DbId,
    pub level: String,
    pub component: String,
    pub message: String,
    pub created_at: Timestamp,
}
