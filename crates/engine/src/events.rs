//! Engine lifecycle notifications.
//!
//! Broadcast on a `tokio::sync::broadcast` channel owned by the
//! orchestrator. Subscribers are optional; when none exist events are
//! dropped (the job store remains the source of truth -- observers that
//! need history poll through the progress publisher instead).

use serde::Serialize;
use vmshift_core::types::DbId;

/// Broadcast channel capacity for engine events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A lifecycle or progress notification from the execution engine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    JobStarted {
        job_id: DbId,
        vm_name: String,
    },
    PhaseStarted {
        job_id: DbId,
        phase: &'static str,
    },
    /// Emitted after every persisted progress increment.
    Progress {
        job_id: DbId,
        percent: i16,
    },
    JobCompleted {
        job_id: DbId,
        target_node: String,
    },
    JobFailed {
        job_id: DbId,
        kind: &'static str,
        detail: String,
    },
}
