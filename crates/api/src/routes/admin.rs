//! Route definitions for the `/admin` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{admin, tailor_applications};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /stats                                -> platform_stats
/// GET    /users                                -> list_users
/// PATCH  /users/{id}/toggle-active             -> toggle_user_active
/// GET    /appointments                         -> list_appointments
///
/// GET    /tailor-applications                  -> list_applications
/// GET    /tailor-applications/{id}             -> get_application
/// POST   /tailor-applications/{id}/approve     -> approve_application
/// POST   /tailor-applications/{id}/reject      -> reject_application
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::platform_stats))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/toggle-active", patch(admin::toggle_user_active))
        .route("/appointments", get(admin::list_appointments))
        .route(
            "/tailor-applications",
            get(tailor_applications::list_applications),
        )
        .route(
            "/tailor-applications/{id}",
            get(tailor_applications::get_application),
        )
        .route(
            "/tailor-applications/{id}/approve",
            post(tailor_applications::approve_application),
        )
        .route(
            "/tailor-applications/{id}/reject",
            post(tailor_applications::reject_application),
        )
}
