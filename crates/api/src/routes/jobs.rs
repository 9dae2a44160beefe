//! Route definitions for the `/jobs` resource.
//!
//! All endpoints require authentication; the stream route takes its
//! token as a query parameter.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET    /                -> list_jobs
/// POST   /                -> submit_job
/// POST   /batch           -> submit_batch
/// GET    /{id}            -> get_job
/// POST   /{id}/dispatch   -> dispatch_job
/// GET    /{id}/logs       -> job_logs
/// GET    /{id}/stream     -> stream_job (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(jobs::list_jobs).post(jobs::submit_job))
        .route("/batch", post(jobs::submit_batch))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/dispatch", post(jobs::dispatch_job))
        .route("/{id}/logs", get(jobs::job_logs))
        .route("/{id}/stream", get(jobs::stream_job))
}
