//! Route definitions for the `/system-events` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::system_events;
use crate::state::AppState;

/// Routes mounted at `/system-events`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(system_events::list_system_events))
}
