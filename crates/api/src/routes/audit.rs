//! Route definitions for the audit log.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit-logs`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /        -> query_audit_logs (?page, page_size, action, user_id, resource_type)
/// GET  /stats   -> audit_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(audit::query_audit_logs))
        .route("/stats", get(audit::audit_stats))
}
