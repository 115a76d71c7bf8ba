//! Handlers for the audit log. All endpoints require admin role.

use atelier_core::pagination::Page;
use atelier_db::models::audit::{AuditFilter, AuditLog, AuditStats};
use atelier_db::repositories::AuditLogRepo;
use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit-logs
///
/// Newest first, filtered by `action`, `user_id` and `resource_type`.
/// The page envelope is the body itself, not wrapped in `data`.
pub async fn query_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(page): Query<PageParams>,
    Query(filter): Query<AuditFilter>,
) -> AppResult<Json<Page<AuditLog>>> {
    let page = page.resolve();
    let items = AuditLogRepo::query(&state.pool, &filter, page.limit(), page.offset()).await?;
    let total = AuditLogRepo::count(&state.pool, &filter).await?;
    Ok(Json(Page::new(items, total, page)))
}

/// GET /api/v1/audit-logs/stats
pub async fn audit_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AuditStats>>> {
    let stats = AuditLogRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
