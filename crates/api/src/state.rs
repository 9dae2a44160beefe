use std::sync::Arc;

use vmshift_engine::dispatcher::JobDispatcher;
use vmshift_engine::publisher::ProgressPublisher;
use vmshift_gateway::ProviderGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vmshift_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Job dispatcher (at-most-one active execution per job id).
    pub dispatcher: Arc<JobDispatcher>,
    /// Poll-based progress publisher backing the SSE stream route.
    pub publisher: Arc<ProgressPublisher>,
    /// Provider gateway for live inventory relays.
    pub gateway: Arc<dyn ProviderGateway>,
}
