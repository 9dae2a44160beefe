//! Poll-based progress subscriptions.
//!
//! A subscription re-reads the job store on a fixed interval instead of
//! listening on a push channel -- a deliberate simplicity/robustness
//! tradeoff. Swapping in a push-based implementation later only touches
//! this module; the orchestrator is oblivious.
//!
//! Each poll cycle emits the job's unseen log entries oldest-first, then
//! one progress event, then -- once the job is terminal -- a final done
//! event, after which the stream ends. A fresh subscription replays the
//! full log history; within one subscription no entry is emitted twice.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use serde::Serialize;
use vmshift_core::types::DbId;

use crate::store::JobStore;

/// Default poll interval for subscriptions.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One event on a job's progress stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// An unseen log entry, emitted oldest-first.
    Log { entry_id: DbId, message: String },
    /// Current progress percentage, emitted once per poll cycle.
    Progress { percent: i16 },
    /// Terminal status; the stream ends after this event.
    Done { status: &'static str },
}

/// Produces lazy event streams over the job store.
pub struct ProgressPublisher {
    store: Arc<dyn JobStore>,
    poll_interval: Duration,
}

impl ProgressPublisher {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval (tests use a few milliseconds).
    pub fn with_poll_interval(store: Arc<dyn JobStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Open a subscription for one job id.
    ///
    /// The first poll happens immediately, so subscribing to an
    /// already-terminal job yields its full history without waiting out
    /// the interval. Subscribing to an id with no job row ends the
    /// stream straight away. A job that never reaches a terminal state
    /// keeps the stream alive until the caller drops it.
    pub fn subscribe(&self, job_id: DbId) -> impl Stream<Item = JobEvent> + Send + 'static {
        let state = Subscription {
            store: Arc::clone(&self.store),
            job_id,
            poll_interval: self.poll_interval,
            last_seen_log_id: 0,
            pending: VecDeque::new(),
            finished: false,
            first_poll: true,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Some((event, state));
                }
                if state.finished {
                    return None;
                }
                if !state.first_poll {
                    tokio::time::sleep(state.poll_interval).await;
                }
                state.first_poll = false;
                state.poll().await;
            }
        })
    }
}

/// Per-subscription cursor state.
struct Subscription {
    store: Arc<dyn JobStore>,
    job_id: DbId,
    poll_interval: Duration,
    last_seen_log_id: DbId,
    pending: VecDeque<JobEvent>,
    finished: bool,
    first_poll: bool,
}

impl Subscription {
    /// One poll cycle: refill the pending queue from the store.
    ///
    /// Store errors are logged and the cycle skipped; the subscription
    /// retries on the next interval rather than tearing down an SSE
    /// connection over a transient read failure.
    async fn poll(&mut self) {
        let job = match self.store.get_job(self.job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                self.finished = true;
                return;
            }
            Err(e) => {
                tracing::warn!(job_id = self.job_id, error = %e, "Progress poll failed, retrying");
                return;
            }
        };

        match self
            .store
            .list_logs_after(self.job_id, self.last_seen_log_id)
            .await
        {
            Ok(entries) => {
                for entry in entries {
                    self.last_seen_log_id = entry.id;
                    self.pending.push_back(JobEvent::Log {
                        entry_id: entry.id,
                        message: entry.message,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(job_id = self.job_id, error = %e, "Log poll failed, retrying");
            }
        }

        self.pending.push_back(JobEvent::Progress {
            percent: job.progress,
        });

        if job.is_terminal() {
            self.pending.push_back(JobEvent::Done {
                status: job.status().as_str(),
            });
            self.finished = true;
        }
    }
}
