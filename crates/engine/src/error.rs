//! Engine error taxonomy.

use vmshift_core::types::DbId;
use vmshift_gateway::ConnectivityError;

use crate::store::StoreError;

/// Everything that can end a migration run.
///
/// All variants are fatal for the current run; the orchestrator's outer
/// guard reflects them into job state before they propagate. `kind()`
/// supplies the stable tag used in `"Failed: <kind>: <detail>"` log
/// entries -- failure classification is carried by this enum, never by
/// stringified type names.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No job row exists for the submitted id; there is nothing to mark
    /// as failed.
    #[error("Migration job {0} not found")]
    JobNotFound(DbId),

    /// A provider or VM reference on the job resolved to nothing.
    #[error("{0}")]
    MissingContext(String),

    /// A provider is registered under the wrong platform kind for the
    /// role the job assigns it.
    #[error("{0}")]
    RoleMismatch(String),

    /// A gateway connectivity check failed.
    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    /// No destination node was specified and the cluster offered none.
    #[error("Destination node not specified and the destination cluster returned no nodes")]
    NoTargetAvailable,

    /// The job store refused or failed a read/write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable failure-kind tag for log entries and system events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JobNotFound(_) => "job not found",
            Self::MissingContext(_) => "missing context",
            Self::RoleMismatch(_) => "role mismatch",
            Self::Connectivity(_) => "connectivity error",
            Self::NoTargetAvailable => "planning error",
            Self::Store(_) => "store error",
        }
    }
}
