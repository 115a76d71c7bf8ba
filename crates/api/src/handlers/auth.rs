//! Handlers for the `/auth` resource (register, login, refresh, logout, me,
//! password reset) and tailor self-registration.

use atelier_core::audit::{actions, resources};
use atelier_core::error::CoreError;
use atelier_core::roles::{
    login_block_reason, ACCOUNT_ACTIVE, ACCOUNT_PENDING, ROLE_CUSTOMER, ROLE_TAILOR,
};
use atelier_core::types::DbId;
use atelier_db::models::session::CreateSession;
use atelier_db::models::user::{CreateUser, User, UserResponse};
use atelier_db::repositories::{SessionRepo, UserRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::AuditEntry;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 20, message = "must be 10 to 20 characters"))]
    pub phone: Option<String>,
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub full_name: String,
}

/// Request body for `POST /tailors/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct TailorRegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 20, message = "must be 10 to 20 characters"))]
    pub phone: Option<String>,
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub full_name: String,
    #[validate(range(min = 0, max = 60, message = "must be between 0 and 60"))]
    pub experience_years: Option<i32>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub specialization: Option<String>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub bio: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/password-reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Customer self-registration. The role is always `customer`.
pub async fn register(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    ensure_identity_free(&state, &input.email, input.phone.as_deref()).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            password_hash,
            full_name: input.full_name,
            role: ROLE_CUSTOMER.to_string(),
            account_status: ACCOUNT_ACTIVE.to_string(),
            experience_years: None,
            specialization: None,
            bio: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Customer registered");
    AuditEntry::new(actions::USER_REGISTER)
        .user(user.id)
        .resource(resources::USER, user.id)
        .details(serde_json::json!({ "email": user.email, "role": user.role }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// POST /api/v1/tailors/register
///
/// Submit a tailor application. The account is created `pending` and cannot
/// log in until an admin approves it.
pub async fn register_tailor(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<TailorRegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    ensure_identity_free(&state, &input.email, input.phone.as_deref()).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            password_hash,
            full_name: input.full_name,
            role: ROLE_TAILOR.to_string(),
            account_status: ACCOUNT_PENDING.to_string(),
            experience_years: input.experience_years,
            specialization: input.specialization,
            bio: input.bio,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Tailor application submitted");
    AuditEntry::new(actions::TAILOR_REGISTERED)
        .user(user.id)
        .resource(resources::USER, user.id)
        .details(serde_json::json!({
            "email": user.email,
            "experience_years": user.experience_years,
            "specialization": user.specialization,
        }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Application submitted successfully! Your account is pending approval. \
             You'll be notified once an admin reviews your application.",
        )),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();

    // 1. Find user by email.
    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        AuditEntry::new(actions::USER_LOGIN_FAILED)
            .details(serde_json::json!({ "email": email, "reason": "unknown_email" }))
            .client(&client)
            .record(&state.pool)
            .await;
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    };

    // 2. Check if the account is temporarily locked.
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 3. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 4. On failure: increment counter, lock if threshold reached.
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }

        AuditEntry::new(actions::USER_LOGIN_FAILED)
            .user(user.id)
            .resource(resources::USER, user.id)
            .details(serde_json::json!({ "email": email, "reason": "bad_password" }))
            .client(&client)
            .record(&state.pool)
            .await;
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    // 5. Pending / rejected / suspended accounts get a specific reason.
    if let Some(reason) = login_block_reason(&user.account_status) {
        return Err(AppError::Core(CoreError::Forbidden(reason.into())));
    }
    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is inactive".into(),
        )));
    }

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    AuditEntry::new(actions::USER_LOGIN)
        .user(user.id)
        .resource(resources::USER, user.id)
        .client(&client)
        .record(&state.pool)
        .await;

    // 7. Generate tokens and create session.
    let response = create_auth_response(&state, &user, &client).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Hash the provided refresh token.
    let token_hash = hash_refresh_token(&input.refresh_token);

    // 2. Find matching active session.
    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // 3. Revoke old session (token rotation).
    SessionRepo::revoke(&state.pool, session.id).await?;

    // 4. Reload the user; role or status may have changed since login.
    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active || login_block_reason(&user.account_status).is_some() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is inactive".into(),
        )));
    }

    // 5. Generate new tokens and create new session.
    let response = create_auth_response(&state, &user, &client).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "Sessions revoked");

    AuditEntry::new(actions::USER_LOGOUT)
        .user(auth_user.user_id)
        .resource(resources::USER, auth_user.user_id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/auth/password-reset
///
/// Always answers with the same message so callers cannot probe which
/// emails are registered. Reset links are not delivered yet.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = input.email.trim().to_lowercase();
    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        tracing::info!(user_id = user.id, "Password reset requested");
    }
    Ok(Json(MessageResponse::new(
        "If the email exists, a password reset link has been sent",
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a user by id or fail with 404.
pub(crate) async fn load_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

/// Reject registration when the email or phone already belongs to someone.
async fn ensure_identity_free(state: &AppState, email: &str, phone: Option<&str>) -> AppResult<()> {
    let email = email.trim().to_lowercase();
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }
    if let Some(phone) = phone {
        if UserRepo::find_by_phone(&state.pool, phone).await?.is_some() {
            return Err(AppError::BadRequest(
                "Phone number already registered".into(),
            ));
        }
    }
    Ok(())
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    client: &ClientInfo,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session_input = CreateSession {
        user_id: user.id,
        refresh_token_hash: refresh_hash,
        expires_at,
        user_agent: client.user_agent.clone(),
        ip_address: client.ip_address.clone(),
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        token_type: "bearer",
        expires_in,
        user: UserResponse::from(user),
    })
}
