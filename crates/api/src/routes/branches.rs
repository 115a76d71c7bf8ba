//! Route definitions for branches and tailor availability.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::branches;
use crate::state::AppState;

/// Routes mounted at `/branches`.
///
/// ```text
/// GET    /                    -> list_branches (public)
/// POST   /                    -> create_branch (admin)
/// GET    /{id}                -> get_branch (public)
/// PUT    /{id}                -> update_branch (admin)
/// DELETE /{id}                -> delete_branch (admin, deactivates)
/// GET    /{id}/availability   -> list_availability (?tailor_id)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(branches::list_branches).post(branches::create_branch),
        )
        .route(
            "/{id}",
            get(branches::get_branch)
                .put(branches::update_branch)
                .delete(branches::delete_branch),
        )
        .route("/{id}/availability", get(branches::list_availability))
}

/// Routes mounted at `/availability`.
///
/// ```text
/// POST   /       -> set_availability (tailor for self, admin for anyone)
/// DELETE /{id}   -> delete_availability
/// ```
pub fn availability_router() -> Router<AppState> {
    Router::new()
        .route("/", post(branches::set_availability))
        .route("/{id}", delete(branches::delete_availability))
}
