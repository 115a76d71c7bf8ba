//! Admin-only handlers: platform stats, raw listings, account toggling.
//!
//! All routes require the `admin` role via [`RequireAdmin`].

use atelier_core::audit::{actions, resources};
use atelier_core::types::DbId;
use atelier_db::models::appointment::{Appointment, AppointmentFilter};
use atelier_db::models::stats::KeyCount;
use atelier_db::models::user::{UserFilter, UserResponse};
use atelier_db::repositories::{AppointmentRepo, StatsRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window for the "active users" counter.
const ACTIVE_WINDOW_DAYS: i64 = 30;

const DEFAULT_ADMIN_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct AdminUserParams {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminAppointmentParams {
    pub status: Option<String>,
    pub customer_id: Option<DbId>,
    pub tailor_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub active: i64,
    pub by_role: Vec<KeyCount>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentStats {
    pub total: i64,
    pub by_status: Vec<KeyCount>,
}

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub users: UserStats,
    pub appointments: AppointmentStats,
}

#[derive(Debug, Serialize)]
pub struct ToggleActiveResult {
    pub message: String,
    pub user_id: DbId,
    pub is_active: bool,
}

fn total(counts: &[KeyCount]) -> i64 {
    counts.iter().map(|c| c.count).sum()
}

/// GET /api/v1/admin/stats
pub async fn platform_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let by_role = StatsRepo::users_by_role(&state.pool).await?;
    let since = Utc::now() - Duration::days(ACTIVE_WINDOW_DAYS);
    let active = StatsRepo::active_users_since(&state.pool, since).await?;
    let by_status = StatsRepo::appointments_by_status(&state.pool).await?;

    Ok(Json(DataResponse {
        data: PlatformStats {
            users: UserStats {
                total: total(&by_role),
                active,
                by_role,
            },
            appointments: AppointmentStats {
                total: total(&by_status),
                by_status,
            },
        },
    }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<AdminUserParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (limit, offset) = pagination.resolve(DEFAULT_ADMIN_LIMIT);
    let filter = UserFilter {
        role: params.role,
        is_active: params.is_active,
        account_status: None,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    let users = UserRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<AdminAppointmentParams>,
) -> AppResult<Json<DataResponse<Vec<Appointment>>>> {
    let (limit, offset) = pagination.resolve(DEFAULT_ADMIN_LIMIT);
    let filter = AppointmentFilter {
        customer_id: params.customer_id,
        tailor_id: params.tailor_id,
        status: params.status,
        ..Default::default()
    };
    let appointments = AppointmentRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// PATCH /api/v1/admin/users/{id}/toggle-active
///
/// Flips `is_active`. An admin cannot deactivate their own account.
pub async fn toggle_user_active(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ToggleActiveResult>>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Cannot change the active status of your own account".into(),
        ));
    }

    let user = UserRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(user_id = id, is_active = user.is_active, "User active flag toggled");
    AuditEntry::new(actions::USER_TOGGLED_ACTIVE)
        .user(admin.user_id)
        .resource(resources::USER, id)
        .details(serde_json::json!({ "is_active": user.is_active }))
        .client(&client)
        .record(&state.pool)
        .await;

    let verb = if user.is_active { "activated" } else { "deactivated" };
    Ok(Json(DataResponse {
        data: ToggleActiveResult {
            message: format!("User {verb} successfully"),
            user_id: user.id,
            is_active: user.is_active,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_grouped_counts() {
        let counts = vec![
            KeyCount { key: "customer".into(), count: 7 },
            KeyCount { key: "tailor".into(), count: 2 },
        ];
        assert_eq!(total(&counts), 9);
        assert_eq!(total(&[]), 0);
    }
}
