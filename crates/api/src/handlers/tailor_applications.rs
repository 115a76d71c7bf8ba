//! Admin review of tailor applications.

use atelier_core::audit::{actions, resources};
use atelier_core::error::CoreError;
use atelier_core::roles::{ACCOUNT_ACTIVE, ACCOUNT_PENDING, ACCOUNT_REJECTED, ROLE_TAILOR};
use atelier_core::types::DbId;
use atelier_db::models::user::{UserFilter, UserResponse};
use atelier_db::repositories::UserRepo;
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Applications are few; one page holds them all.
const MAX_APPLICATIONS: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ApplicationListParams {
    /// `pending` (default), `approved`, or `rejected`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub notes: Option<String>,
}

/// Map the public filter name to the stored account status.
fn account_status_filter(status: Option<&str>) -> AppResult<&'static str> {
    match status.unwrap_or(ACCOUNT_PENDING) {
        "pending" => Ok(ACCOUNT_PENDING),
        "approved" | "active" => Ok(ACCOUNT_ACTIVE),
        "rejected" => Ok(ACCOUNT_REJECTED),
        other => Err(AppError::BadRequest(format!(
            "Unknown application status '{other}'"
        ))),
    }
}

/// GET /api/v1/admin/tailor-applications
pub async fn list_applications(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ApplicationListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let filter = UserFilter {
        role: Some(ROLE_TAILOR.to_string()),
        account_status: Some(account_status_filter(params.status.as_deref())?.to_string()),
        ..Default::default()
    };
    let users = UserRepo::list(&state.pool, &filter, MAX_APPLICATIONS, 0).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/tailor-applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|u| u.role == ROLE_TAILOR)
        .ok_or_else(|| AppError::not_found("Application", id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/admin/tailor-applications/{id}/approve
pub async fn approve_application(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    body: Option<Json<ReviewRequest>>,
) -> AppResult<Json<MessageResponse>> {
    let notes = body.map(|Json(b)| b.notes).unwrap_or_default();
    review(&state, admin.user_id, &client, id, true, notes).await
}

/// POST /api/v1/admin/tailor-applications/{id}/reject
pub async fn reject_application(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    body: Option<Json<ReviewRequest>>,
) -> AppResult<Json<MessageResponse>> {
    let notes = body
        .and_then(|Json(b)| b.notes)
        .filter(|n| !n.trim().is_empty())
        .or_else(|| Some("Application rejected".to_string()));
    review(&state, admin.user_id, &client, id, false, notes).await
}

async fn review(
    state: &AppState,
    reviewer_id: DbId,
    client: &ClientInfo,
    id: DbId,
    approved: bool,
    notes: Option<String>,
) -> AppResult<Json<MessageResponse>> {
    let (status, action) = if approved {
        (ACCOUNT_ACTIVE, actions::TAILOR_APPROVED)
    } else {
        (ACCOUNT_REJECTED, actions::TAILOR_REJECTED)
    };

    let tailor =
        UserRepo::review_application(&state.pool, id, status, reviewer_id, notes.as_deref())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Pending application",
                    id,
                })
            })?;

    tracing::info!(tailor_id = tailor.id, reviewer_id, approved, "Tailor application reviewed");
    AuditEntry::new(action)
        .user(reviewer_id)
        .resource(resources::USER, tailor.id)
        .details(serde_json::json!({
            "tailor_name": tailor.full_name,
            "tailor_email": tailor.email,
            "notes": notes,
        }))
        .client(client)
        .record(&state.pool)
        .await;

    state.publish(
        PlatformEvent::new(action)
            .with_source(resources::USER, tailor.id)
            .with_actor(reviewer_id)
            .with_payload(serde_json::json!({ "notes": notes })),
    );

    let verdict = if approved { "approved successfully!" } else { "rejected." };
    Ok(Json(MessageResponse::new(format!(
        "Tailor application for {} {verdict}",
        tailor.full_name
    ))))
}
