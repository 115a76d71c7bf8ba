//! Route definitions for measurement profiles and their versions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::measurements;
use crate::state::AppState;

/// Routes mounted at `/measurements`.
///
/// ```text
/// GET    /profiles                          -> list_profiles
/// POST   /profiles                          -> create_profile
/// GET    /profiles/{id}                     -> get_profile
/// PUT    /profiles/{id}                     -> update_profile
/// DELETE /profiles/{id}                     -> delete_profile
/// GET    /profiles/{id}/versions            -> list_versions
/// POST   /profiles/{id}/versions            -> add_version
/// GET    /profiles/{id}/compare             -> compare_versions (?from, to)
/// POST   /profiles/{id}/approve             -> review_profile (tailor/admin/staff)
/// GET    /profiles/{id}/fit-recommendation  -> fit_recommendation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profiles",
            get(measurements::list_profiles).post(measurements::create_profile),
        )
        .route(
            "/profiles/{id}",
            get(measurements::get_profile)
                .put(measurements::update_profile)
                .delete(measurements::delete_profile),
        )
        .route(
            "/profiles/{id}/versions",
            get(measurements::list_versions).post(measurements::add_version),
        )
        .route(
            "/profiles/{id}/compare",
            get(measurements::compare_versions),
        )
        .route("/profiles/{id}/approve", post(measurements::review_profile))
        .route(
            "/profiles/{id}/fit-recommendation",
            get(measurements::fit_recommendation),
        )
}
