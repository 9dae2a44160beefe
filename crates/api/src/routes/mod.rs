//! Route definitions, one module per resource.

pub mod auth;
pub mod health;
pub mod jobs;
pub mod providers;
pub mod system_events;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/providers", providers::router())
        .nest("/jobs", jobs::router())
        .nest("/system-events", system_events::router())
}
