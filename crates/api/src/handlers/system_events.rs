//! Handlers for the operator-facing system event trail.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use vmshift_db::repositories::SystemEventRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SystemEventQuery {
    /// Maximum number of events to return (default 100).
    pub limit: Option<i64>,
}

/// GET /api/v1/system-events
///
/// Most recent events first.
pub async fn list_system_events(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SystemEventQuery>,
) -> AppResult<impl IntoResponse> {
    let events = SystemEventRepo::list_recent(&state.pool, params.limit).await?;
    Ok(Json(DataResponse { data: events }))
}
