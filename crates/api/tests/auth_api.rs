//! HTTP-level integration tests for registration, login, refresh, logout and
//! the tailor application flow.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, post_json, post_json_auth, token_for, TEST_PASSWORD,
};
use sqlx::PgPool;

async fn login(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_customer(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "email": "Asha@Example.com",
            "password": "long-enough-pw",
            "full_name": "Asha Rao",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "asha@example.com");
    assert_eq!(json["data"]["role"], "customer");
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "email": "short@example.com",
            "password": "short",
            "full_name": "Short Pw",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_email(pool: PgPool) {
    create_user(&pool, "taken@example.com", "customer").await;
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "email": "taken@example.com",
            "password": "long-enough-pw",
            "full_name": "Second",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email already registered");
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "login@example.com", "customer").await;
    let app = common::build_test_app(pool);

    let response = login(app, "login@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["user"]["id"], user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_user(&pool, "wrongpw@example.com", "customer").await;
    let app = common::build_test_app(pool);

    let response = login(app, "wrongpw@example.com", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = login(app, "ghost@example.com", "whatever-pw").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five bad passwords lock the account, even for the right password.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_locks_after_failed_attempts(pool: PgPool) {
    create_user(&pool, "locked@example.com", "customer").await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let response = login(app, "locked@example.com", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let app = common::build_test_app(pool);
    let response = login(app, "locked@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    create_user(&pool, "refresh@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let login_json = body_json(login(app, "refresh@example.com", TEST_PASSWORD).await).await;
    let refresh_token = login_json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"].as_str().unwrap(), refresh_token);

    // The old token was revoked by the rotation.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_returns_no_content(pool: PgPool) {
    let user = create_user(&pool, "logout@example.com", "customer").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/auth/logout",
        serde_json::json!({}),
        &token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let user = create_user(&pool, "me@example.com", "staff").await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token_for(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "staff");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_reset_is_always_ok(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/password-reset",
        serde_json::json!({ "email": "nobody@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Tailor applications
// ---------------------------------------------------------------------------

/// A tailor application cannot log in until an admin approves it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tailor_application_approval_flow(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/tailors/register",
        serde_json::json!({
            "email": "tailor@example.com",
            "password": "long-enough-pw",
            "full_name": "Ravi Tailor",
            "experience_years": 12,
            "specialization": "Sherwani",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = login(app, "tailor@example.com", "long-enough-pw").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        "/api/v1/admin/tailor-applications",
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let applications = json["data"].as_array().unwrap();
    assert_eq!(applications.len(), 1);
    let tailor_id = applications[0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/tailor-applications/{tailor_id}/approve"),
        serde_json::json!({ "notes": "Welcome aboard" }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = login(app, "tailor@example.com", "long-enough-pw").await;
    assert_eq!(response.status(), StatusCode::OK);
}
