//! Handlers for the `/jobs` resource.
//!
//! Submission (single and batch), listing, the log trail, re-dispatch,
//! and the SSE progress stream. All endpoints require authentication;
//! the stream route accepts the token as a query parameter because
//! `EventSource` cannot set headers.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use vmshift_core::error::CoreError;
use vmshift_core::types::{DbId, Timestamp};
use vmshift_db::models::{Job, JobListQuery, JobStatus, NewJob};
use vmshift_db::repositories::{JobLogRepo, JobRepo, VmRepo};
use vmshift_engine::publisher::JobEvent;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// SSE keep-alive interval for the progress stream.
const STREAM_KEEPALIVE: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Outward job representation: status as its wire name instead of the
/// lookup-table id.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: DbId,
    pub vm_name: String,
    pub status: &'static str,
    pub progress: i16,
    pub source_provider_id: Option<DbId>,
    pub destination_provider_id: Option<DbId>,
    pub source_vm_id: Option<DbId>,
    pub target_node: Option<String>,
    pub created_at: Timestamp,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: JobStatus::from_id(job.status_id)
                .map(JobStatus::as_str)
                .unwrap_or("unknown"),
            vm_name: job.vm_name,
            progress: job.progress,
            source_provider_id: job.source_provider_id,
            destination_provider_id: job.destination_provider_id,
            source_vm_id: job.source_vm_id,
            target_node: job.target_node,
            created_at: job.created_at,
        }
    }
}

/// DTO for `POST /api/v1/jobs/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchNewJob {
    pub source_provider_id: DbId,
    pub destination_provider_id: DbId,
    pub source_vm_ids: Vec<DbId>,
    pub target_node: Option<String>,
}

/// Query parameters for the SSE stream route.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_job(pool: &sqlx::PgPool, id: DbId) -> AppResult<Job> {
    JobRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))
}

/// Create one queued job for a discovered VM and hand it to the
/// dispatcher. The VM's display name is captured onto the job row at
/// creation time.
async fn create_and_dispatch(state: &AppState, input: &NewJob) -> AppResult<Job> {
    let vm = VmRepo::find_by_id(&state.pool, input.source_vm_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VirtualMachine",
            id: input.source_vm_id,
        }))?;

    let job = JobRepo::create(&state.pool, &vm.name, input).await?;

    tracing::info!(job_id = job.id, vm_name = %job.vm_name, "Job submitted");

    // The row stays queued if dispatch is rejected; the caller can retry
    // via POST /jobs/{id}/dispatch once a slot frees up.
    state.dispatcher.submit(job.id).await?;

    Ok(job)
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Persist a queued job and dispatch it. Returns 201 with the job, or
/// 503 when every worker slot is busy (the job stays queued and can be
/// re-dispatched).
pub async fn submit_job(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewJob>,
) -> AppResult<impl IntoResponse> {
    let job = create_and_dispatch(&state, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: JobView::from(job),
        }),
    ))
}

/// POST /api/v1/jobs/batch
///
/// Submit one job per VM id. Saturation mid-batch leaves the remaining
/// jobs queued (and logged) rather than failing the whole request.
pub async fn submit_batch(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BatchNewJob>,
) -> AppResult<impl IntoResponse> {
    let mut jobs = Vec::with_capacity(input.source_vm_ids.len());

    for vm_id in &input.source_vm_ids {
        let single = NewJob {
            source_provider_id: input.source_provider_id,
            destination_provider_id: input.destination_provider_id,
            source_vm_id: *vm_id,
            target_node: input.target_node.clone(),
        };
        match create_and_dispatch(&state, &single).await {
            Ok(job) => jobs.push(JobView::from(job)),
            Err(AppError::Dispatch(e)) => {
                tracing::warn!(vm_id, error = %e, "Batch job left queued, dispatch rejected");
            }
            Err(other) => return Err(other),
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: jobs })))
}

/// POST /api/v1/jobs/{id}/dispatch
///
/// Re-dispatch a job that is still `queued` (e.g. after an earlier
/// saturation rejection). Terminal and running jobs are refused with 409.
pub async fn dispatch_job(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, job_id).await?;

    if job.status() != JobStatus::Queued {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Job {job_id} is {} and cannot be dispatched",
            job.status().as_str(),
        ))));
    }

    state.dispatcher.submit(job_id).await?;

    Ok(StatusCode::ACCEPTED)
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs
pub async fn list_jobs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = JobRepo::list(&state.pool, &params).await?;
    let views: Vec<JobView> = jobs.into_iter().map(JobView::from).collect();
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state.pool, job_id).await?;
    Ok(Json(DataResponse {
        data: JobView::from(job),
    }))
}

/// GET /api/v1/jobs/{id}/logs
///
/// The full log trail, oldest first.
pub async fn job_logs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_job(&state.pool, job_id).await?;
    let entries = JobLogRepo::list_after(&state.pool, job_id, 0).await?;
    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}/stream?token=...
///
/// Server-sent progress events: a `data:`-only frame per log entry, an
/// `event: progress` frame per poll, and a final `event: done` frame
/// carrying the terminal status, after which the stream closes.
pub async fn stream_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Query(query): Query<StreamQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // EventSource cannot set headers; the token arrives as a query
    // parameter and is validated the same way as the bearer header.
    validate_token(&query.token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    find_job(&state.pool, job_id).await?;

    let stream = state
        .publisher
        .subscribe(job_id)
        .map(|event| Ok::<_, Infallible>(encode_sse_event(event)));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(STREAM_KEEPALIVE)
            .text("ping"),
    ))
}

/// Map an engine event onto the wire frames the original stream contract
/// uses.
fn encode_sse_event(event: JobEvent) -> Event {
    match event {
        JobEvent::Log { message, .. } => Event::default().data(message),
        JobEvent::Progress { percent } => {
            Event::default().event("progress").data(percent.to_string())
        }
        JobEvent::Done { status } => Event::default().event("done").data(status),
    }
}
