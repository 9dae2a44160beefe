//! Migration job execution engine.
//!
//! Takes a queued job, validates its preconditions, advances it through an
//! ordered sequence of phases with incremental progress, persists a durable
//! log trail, and exposes live progress to observers.
//!
//! The moving parts:
//!
//! - [`store::JobStore`] — the durable-state contract ([`store::PgStore`]
//!   for PostgreSQL, [`store::MemoryStore`] for tests and tooling).
//! - [`orchestrator::MigrationOrchestrator`] — the per-job state machine.
//! - [`dispatcher::JobDispatcher`] — at-most-one active execution per job
//!   id, bounded worker slots.
//! - [`publisher::ProgressPublisher`] — poll-based event streams for
//!   observers (SSE responders, CLIs).

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod phases;
pub mod publisher;
pub mod store;

pub use dispatcher::{DispatchError, JobDispatcher};
pub use error::EngineError;
pub use events::EngineEvent;
pub use orchestrator::{MigrationOrchestrator, MigrationOutcome, PacingConfig};
pub use publisher::{JobEvent, ProgressPublisher};
pub use store::{JobStore, JobUpdate, MemoryStore, PgStore, StoreError};
