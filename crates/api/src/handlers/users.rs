//! Handlers for the `/users` resource: own profile, password change, and
//! admin/staff user management.

use atelier_core::audit::{actions, resources};
use atelier_core::error::CoreError;
use atelier_core::pagination::Page;
use atelier_core::roles::{is_valid_role, ROLE_CUSTOMER};
use atelier_core::types::DbId;
use atelier_db::models::user::{UpdateUser, UserFilter, UserResponse};
use atelier_db::repositories::{SessionRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::audit::AuditEntry;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::PageParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `PUT /users/me`. Role and status fields are not self-editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 10, max = 20, message = "must be 10 to 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub specialization: Option<String>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    if let Some(phone) = input.phone.as_deref() {
        if let Some(other) = UserRepo::find_by_phone(&state.pool, phone).await? {
            if other.id != auth_user.user_id {
                return Err(AppError::BadRequest("Phone number already in use".into()));
            }
        }
    }

    let update = UpdateUser {
        full_name: input.full_name,
        phone: input.phone,
        specialization: input.specialization,
        bio: input.bio,
        ..Default::default()
    };
    let user = UserRepo::update(&state.pool, auth_user.user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User", auth_user.user_id))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/users/me/password
///
/// Verifies the current password, stores the new hash, and signs out every
/// other session.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = load_user(&state, auth_user.user_id).await?;

    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    AuditEntry::new(actions::USER_PASSWORD_CHANGED)
        .user(user.id)
        .resource(resources::USER, user.id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

// ---------------------------------------------------------------------------
// Management
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// Paginated user listing with role / active / free-text filters. Admin or staff.
pub async fn list_users(
    State(state): State<AppState>,
    RequireStaff(_caller): RequireStaff,
    Query(page): Query<PageParams>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Page<UserResponse>>>> {
    if let Some(role) = params.role.as_deref() {
        if !is_valid_role(role) {
            return Err(AppError::BadRequest(format!("Unknown role '{role}'")));
        }
    }
    let filter = UserFilter {
        role: params.role,
        is_active: params.is_active,
        account_status: None,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    let page = page.resolve();

    let users = UserRepo::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    let total = UserRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(
            users.into_iter().map(UserResponse::from).collect(),
            total,
            page,
        ),
    }))
}

/// GET /api/v1/users/{id}
///
/// Anyone may read their own profile; admin and staff may read all; tailors
/// may read customers.
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, id).await?;

    if user.id != auth_user.user_id && !auth_user.sees_all() {
        if auth_user.is_tailor() {
            if user.role != ROLE_CUSTOMER {
                return Err(AppError::forbidden(
                    "Tailors can only view customer details",
                ));
            }
        } else {
            return Err(AppError::forbidden("You can only view your own profile"));
        }
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(role) = input.role.as_deref() {
        if !is_valid_role(role) {
            return Err(AppError::BadRequest(format!("Unknown role '{role}'")));
        }
    }
    if let Some(name) = input.full_name.as_deref() {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("full_name must not be empty".into()));
        }
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    AuditEntry::new(actions::USER_UPDATED)
        .user(admin.user_id)
        .resource(resources::USER, user.id)
        .details(serde_json::json!({
            "role": input.role,
            "is_active": input.is_active,
            "is_priority": input.is_priority,
        }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".into(),
        ));
    }
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("User", id));
    }

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
    AuditEntry::new(actions::USER_DELETED)
        .user(admin.user_id)
        .resource(resources::USER, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
