//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level. Ownership checks (a customer reading
//! their own order) stay in the handlers.

use atelier_core::error::CoreError;
use atelier_core::roles::{ROLE_ADMIN, ROLE_STAFF, ROLE_TAILOR};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then require the caller's role to be one of `allowed`.
async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[&str],
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed.contains(&user.role.as_str()) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `admin` or `staff` role (front-desk operations).
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_ADMIN, ROLE_STAFF],
            "Admin or Staff role required",
        )
        .await
        .map(RequireStaff)
    }
}

/// Requires `tailor` or `admin` role.
///
/// ```ignore
/// async fn workshop(RequireTailorOrAdmin(user): RequireTailorOrAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTailorOrAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireTailorOrAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_TAILOR, ROLE_ADMIN],
            "Tailor or Admin role required",
        )
        .await
        .map(RequireTailorOrAdmin)
    }
}

/// Requires `tailor`, `admin`, or `staff` role: anyone who works in the shop.
pub struct RequireWorkshop(pub AuthUser);

impl FromRequestParts<AppState> for RequireWorkshop {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(
            parts,
            state,
            &[ROLE_TAILOR, ROLE_ADMIN, ROLE_STAFF],
            "Tailor, Admin or Staff role required",
        )
        .await
        .map(RequireWorkshop)
    }
}

/// Requires the `tailor` role.
pub struct RequireTailor(pub AuthUser);

impl FromRequestParts<AppState> for RequireTailor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, &[ROLE_TAILOR], "Tailor role required")
            .await
            .map(RequireTailor)
    }
}
