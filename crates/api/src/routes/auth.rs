//! Route definitions for the `/auth` resource and tailor self-registration.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register        -> register (public)
/// POST /login           -> login (public)
/// POST /refresh         -> refresh (public)
/// POST /logout          -> logout (requires auth)
/// GET  /me              -> me (requires auth)
/// POST /password-reset  -> request_password_reset (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password-reset", post(auth::request_password_reset))
}

/// Routes mounted at `/tailors`.
///
/// ```text
/// POST /register  -> register_tailor (public, account starts pending)
/// ```
pub fn tailors_router() -> Router<AppState> {
    Router::new().route("/register", post(auth::register_tailor))
}
