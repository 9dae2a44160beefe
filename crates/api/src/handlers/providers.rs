//! Handlers for the `/providers` resource.
//!
//! Registration, listing, deletion, and the live source-inventory relay.
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vmshift_core::error::CoreError;
use vmshift_core::types::DbId;
use vmshift_db::models::{DiscoveredVm, NewProvider, Provider, ProviderKind};
use vmshift_db::repositories::{ProviderRepo, VmRepo};
use vmshift_gateway::ProviderEndpoint;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_provider(pool: &sqlx::PgPool, id: DbId) -> AppResult<Provider> {
    ProviderRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Provider",
            id,
        }))
}

/// Per-call gateway endpoint from a provider row; credentials pass
/// straight through and are never logged.
fn endpoint_for(provider: &Provider) -> ProviderEndpoint {
    ProviderEndpoint {
        api_url: provider.api_url.clone(),
        username: provider.username.clone().unwrap_or_default(),
        secret: provider.secret.clone().unwrap_or_default(),
        verify_tls: provider.verify_tls,
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/providers
///
/// Register a provider endpoint. Returns 201 with the created row
/// (secret omitted).
pub async fn create_provider(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewProvider>,
) -> AppResult<impl IntoResponse> {
    let kind = ProviderKind::from_str_name(&input.kind).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown provider kind '{}'; expected 'vcenter' or 'proxmox'",
            input.kind,
        ))
    })?;

    let provider = ProviderRepo::create(
        &state.pool,
        &input.name,
        kind,
        &input.api_url,
        input.username.as_deref(),
        input.secret.as_deref(),
        input.verify_tls,
    )
    .await?;

    tracing::info!(
        provider_id = provider.id,
        kind = kind.as_str(),
        user_id = auth.user_id,
        "Provider registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: provider })))
}

/// GET /api/v1/providers
pub async fn list_providers(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let providers = ProviderRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: providers }))
}

/// DELETE /api/v1/providers/{id}
///
/// Returns 204. Jobs referencing the provider keep running; their
/// foreign keys null out.
pub async fn delete_provider(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ProviderRepo::delete(&state.pool, provider_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Provider",
            id: provider_id,
        }));
    }

    tracing::info!(provider_id, user_id = auth.user_id, "Provider deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Inventory relay
// ---------------------------------------------------------------------------

/// GET /api/v1/providers/{id}/vms
///
/// Fetch a live inventory snapshot from a vCenter provider, upsert the
/// discovered VMs (so jobs can reference them by row id), and return the
/// stored rows. Connectivity failures surface as 502.
pub async fn list_provider_vms(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let provider = find_provider(&state.pool, provider_id).await?;

    if provider.kind() != Some(ProviderKind::Vcenter) {
        return Err(AppError::BadRequest(
            "VM inventory is only available for vCenter providers".into(),
        ));
    }

    let inventory = state
        .gateway
        .fetch_source_inventory(&endpoint_for(&provider))
        .await?;

    for vm in &inventory.vms {
        let discovered = DiscoveredVm {
            name: vm.name.clone(),
            source_identifier: vm.moid.clone(),
            power_state: vm.power_state.clone(),
            cpu_count: vm.cpu_count,
            memory_bytes: vm.memory_mib.map(|mib| mib * 1024 * 1024),
        };
        VmRepo::upsert_discovered(&state.pool, provider_id, &discovered).await?;
    }

    let rows = VmRepo::list_by_provider(&state.pool, provider_id).await?;

    tracing::info!(
        provider_id,
        vm_count = rows.len(),
        "Source inventory refreshed",
    );

    Ok(Json(DataResponse { data: rows }))
}
