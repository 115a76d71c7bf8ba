//! Handlers for branches and tailor weekly availability.

use atelier_core::audit::{actions, resources};
use atelier_core::roles::ROLE_TAILOR;
use atelier_core::scheduling::{
    validate_availability, DEFAULT_APPOINTMENTS_PER_DAY, DEFAULT_BUFFER_MINUTES,
    DEFAULT_SLOT_MINUTES,
};
use atelier_core::types::DbId;
use atelier_db::models::availability::{CreateAvailability, TailorAvailability};
use atelier_db::models::branch::{Branch, CreateBranch, UpdateBranch};
use atelier_db::repositories::{AvailabilityRepo, BranchRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveTime;
use serde::Deserialize;

use crate::audit::AuditEntry;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireTailorOrAdmin};
use crate::query::IncludeInactiveParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const BRANCH_CODE_CONSTRAINT: &str = "uq_branches_code";

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub tailor_id: Option<DbId>,
}

/// Body for `POST /availability`. Omitted `tailor_id` means the caller.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub tailor_id: Option<DbId>,
    pub branch_id: DbId,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: Option<i32>,
    pub buffer_time_minutes: Option<i32>,
    pub max_appointments_per_day: Option<i32>,
}

async fn load_branch(state: &AppState, id: DbId) -> AppResult<Branch> {
    BranchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Branch", id))
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// GET /api/v1/branches
///
/// Public. Inactive branches are only listed with `include_inactive=true`.
pub async fn list_branches(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Branch>>>> {
    let branches = BranchRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: branches }))
}

/// GET /api/v1/branches/{id}
pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Branch>>> {
    let branch = load_branch(&state, id).await?;
    Ok(Json(DataResponse { data: branch }))
}

/// POST /api/v1/branches
pub async fn create_branch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Json(input): Json<CreateBranch>,
) -> AppResult<(StatusCode, Json<DataResponse<Branch>>)> {
    for (field, value) in [
        ("name", &input.name),
        ("code", &input.code),
        ("address", &input.address),
        ("city", &input.city),
        ("state", &input.state),
        ("pincode", &input.pincode),
    ] {
        require_text(field, value)?;
    }

    let branch = match BranchRepo::create(&state.pool, &input).await {
        Ok(branch) => branch,
        Err(e) if is_unique_violation(&e, BRANCH_CODE_CONSTRAINT) => {
            return Err(AppError::BadRequest("Branch code already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(branch_id = branch.id, code = %branch.code, "Branch created");
    AuditEntry::new(actions::BRANCH_CREATED)
        .user(admin.user_id)
        .resource(resources::BRANCH, branch.id)
        .details(serde_json::json!({ "name": branch.name, "code": branch.code }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: branch })))
}

/// PUT /api/v1/branches/{id}
pub async fn update_branch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBranch>,
) -> AppResult<Json<DataResponse<Branch>>> {
    if let Some(name) = input.name.as_deref() {
        require_text("name", name)?;
    }
    let branch = BranchRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Branch", id))?;

    AuditEntry::new(actions::BRANCH_UPDATED)
        .user(admin.user_id)
        .resource(resources::BRANCH, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse { data: branch }))
}

/// DELETE /api/v1/branches/{id}
///
/// Soft delete: the branch is deactivated and drops out of public listings.
pub async fn delete_branch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    load_branch(&state, id).await?;
    BranchRepo::deactivate(&state.pool, id).await?;

    AuditEntry::new(actions::BRANCH_DELETED)
        .user(admin.user_id)
        .resource(resources::BRANCH, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(MessageResponse::new("Branch deactivated successfully")))
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// GET /api/v1/branches/{id}/availability
pub async fn list_availability(
    State(state): State<AppState>,
    Path(branch_id): Path<DbId>,
    Query(params): Query<AvailabilityQuery>,
) -> AppResult<Json<DataResponse<Vec<TailorAvailability>>>> {
    load_branch(&state, branch_id).await?;
    let windows =
        AvailabilityRepo::list_for_branch(&state.pool, branch_id, params.tailor_id).await?;
    Ok(Json(DataResponse { data: windows }))
}

/// POST /api/v1/availability
///
/// Creates or replaces the window for a tailor, branch and weekday. Tailors
/// may only set their own; admins may set anyone's.
pub async fn set_availability(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    Json(input): Json<AvailabilityRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TailorAvailability>>)> {
    let tailor_id = input.tailor_id.unwrap_or(user.user_id);
    if user.is_tailor() && tailor_id != user.user_id {
        return Err(AppError::forbidden(
            "Tailors can only set their own availability",
        ));
    }

    let is_tailor = UserRepo::find_by_id(&state.pool, tailor_id)
        .await?
        .is_some_and(|u| u.role == ROLE_TAILOR);
    if !is_tailor {
        return Err(AppError::not_found("Tailor", tailor_id));
    }
    load_branch(&state, input.branch_id).await?;

    let create = CreateAvailability {
        tailor_id,
        branch_id: input.branch_id,
        day_of_week: input.day_of_week.trim().to_lowercase(),
        start_time: input.start_time,
        end_time: input.end_time,
        slot_duration_minutes: input.slot_duration_minutes.unwrap_or(DEFAULT_SLOT_MINUTES),
        buffer_time_minutes: input.buffer_time_minutes.unwrap_or(DEFAULT_BUFFER_MINUTES),
        max_appointments_per_day: input
            .max_appointments_per_day
            .unwrap_or(DEFAULT_APPOINTMENTS_PER_DAY),
    };
    validate_availability(
        &create.day_of_week,
        create.start_time,
        create.end_time,
        create.slot_duration_minutes,
        create.buffer_time_minutes,
        create.max_appointments_per_day,
    )?;

    let window = AvailabilityRepo::upsert(&state.pool, &create).await?;
    tracing::info!(
        tailor_id,
        branch_id = window.branch_id,
        day = %window.day_of_week,
        "Availability window saved"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: window })))
}

/// DELETE /api/v1/availability/{id}
pub async fn delete_availability(
    State(state): State<AppState>,
    RequireTailorOrAdmin(user): RequireTailorOrAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let window = AvailabilityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Availability record", id))?;
    if user.is_tailor() && window.tailor_id != user.user_id {
        return Err(AppError::forbidden(
            "Tailors can only remove their own availability",
        ));
    }
    AvailabilityRepo::delete(&state.pool, id).await?;
    Ok(Json(MessageResponse::new("Availability removed")))
}
