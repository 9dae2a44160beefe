//! Background recorder persisting engine lifecycle events as
//! operator-visible system events.
//!
//! Subscribed to the orchestrator's broadcast channel at startup.
//! Persistence is best effort: a failed insert is logged and dropped,
//! never propagated back into the engine.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use vmshift_db::repositories::SystemEventRepo;
use vmshift_db::DbPool;
use vmshift_engine::events::EngineEvent;

/// Persists engine events until cancelled or the channel closes.
pub struct SystemEventRecorder {
    pool: DbPool,
}

impl SystemEventRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the recorder loop. Per-increment progress events are not
    /// persisted (the job row already carries current progress); only
    /// lifecycle transitions land in the trail.
    pub async fn run(self, mut rx: broadcast::Receiver<EngineEvent>, cancel: CancellationToken) {
        tracing::info!("System event recorder started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("System event recorder shutting down");
                    break;
                }
                received = rx.recv() => match received {
                    Ok(event) => self.record(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "System event recorder lagged behind the engine");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Engine event channel closed, recorder stopping");
                        break;
                    }
                },
            }
        }
    }

    async fn record(&self, event: &EngineEvent) {
        let (level, message) = match event {
            EngineEvent::JobStarted { job_id, vm_name } => (
                "INFO",
                format!("Migration job #{job_id} started for VM '{vm_name}'"),
            ),
            EngineEvent::JobCompleted {
                job_id,
                target_node,
            } => (
                "INFO",
                format!("Migration job #{job_id} completed on node '{target_node}'"),
            ),
            EngineEvent::JobFailed {
                job_id,
                kind,
                detail,
            } => (
                "ERROR",
                format!("Migration job #{job_id} failed: {kind}: {detail}"),
            ),
            // Per-increment noise; the job row is the progress record.
            EngineEvent::Progress { .. } | EngineEvent::PhaseStarted { .. } => return,
        };

        if let Err(e) = SystemEventRepo::record(&self.pool, level, "engine", &message).await {
            tracing::error!(error = %e, detail = %message, "Failed to persist system event");
        }
    }
}
