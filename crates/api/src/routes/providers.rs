//! Route definitions for the `/providers` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::providers;
use crate::state::AppState;

/// Routes mounted at `/providers`.
///
/// ```text
/// GET    /           -> list_providers
/// POST   /           -> create_provider
/// DELETE /{id}       -> delete_provider
/// GET    /{id}/vms   -> list_provider_vms
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(providers::list_providers).post(providers::create_provider),
        )
        .route("/{id}", delete(providers::delete_provider))
        .route("/{id}/vms", get(providers::list_provider_vms))
}
