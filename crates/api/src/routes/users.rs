//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /               -> list_users (admin/staff)
/// GET    /me             -> get_me
/// PUT    /me             -> update_me
/// POST   /me/password    -> change_password
/// GET    /{id}           -> get_user
/// PUT    /{id}           -> update_user (admin)
/// DELETE /{id}           -> delete_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/me", get(users::get_me).put(users::update_me))
        .route("/me/password", post(users::change_password))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
