//! Handlers for the `/fabrics` catalog.
//!
//! The catalog is small, so listing loads every fabric and applies
//! [`FabricFilter`] in memory before paging.

use atelier_core::audit::{actions, resources};
use atelier_core::fabric::{validate_fabric, FabricFilter, DEFAULT_PAGE_LIMIT};
use atelier_core::types::DbId;
use atelier_db::models::fabric::{CreateFabric, Fabric, UpdateFabric};
use atelier_db::repositories::FabricRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireTailorOrAdmin};
use crate::query::PaginationParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/v1/fabrics
///
/// Public. Filters: `type`, `color`, `pattern`, `in_stock`, `search`,
/// `max_price`; paged with `skip`/`limit`.
pub async fn list_fabrics(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<FabricFilter>,
) -> AppResult<Json<DataResponse<Vec<Fabric>>>> {
    let (limit, offset) = pagination.resolve(DEFAULT_PAGE_LIMIT);
    let fabrics = filter
        .apply(FabricRepo::list_all(&state.pool).await?)
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect();
    Ok(Json(DataResponse { data: fabrics }))
}

/// GET /api/v1/fabrics/{id}
pub async fn get_fabric(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Fabric>>> {
    let fabric = FabricRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Fabric", id))?;
    Ok(Json(DataResponse { data: fabric }))
}

/// POST /api/v1/fabrics
pub async fn create_fabric(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    client: ClientInfo,
    Json(input): Json<CreateFabric>,
) -> AppResult<(StatusCode, Json<DataResponse<Fabric>>)> {
    validate_fabric(
        Some(&input.name),
        Some(&input.fabric_type),
        Some(input.price_per_meter),
    )?;
    let fabric = FabricRepo::create(&state.pool, &input).await?;

    tracing::info!(fabric_id = fabric.id, name = %fabric.name, "Fabric created");
    AuditEntry::new(actions::FABRIC_CREATED)
        .user(user.user_id)
        .resource(resources::FABRIC, fabric.id)
        .details(serde_json::json!({ "name": fabric.name, "type": fabric.fabric_type }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: fabric })))
}

/// PUT /api/v1/fabrics/{id}
pub async fn update_fabric(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFabric>,
) -> AppResult<Json<DataResponse<Fabric>>> {
    validate_fabric(
        input.name.as_deref(),
        input.fabric_type.as_deref(),
        input.price_per_meter,
    )?;
    let fabric = FabricRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Fabric", id))?;

    AuditEntry::new(actions::FABRIC_UPDATED)
        .user(user.user_id)
        .resource(resources::FABRIC, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: fabric }))
}

/// DELETE /api/v1/fabrics/{id}
pub async fn delete_fabric(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !FabricRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Fabric", id));
    }

    AuditEntry::new(actions::FABRIC_DELETED)
        .user(admin.user_id)
        .resource(resources::FABRIC, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(MessageResponse::new("Fabric deleted successfully")))
}
