//! HTTP-level integration tests for admin surfaces, analytics, search, the
//! tailor dashboard, account self-service and the notification inbox.

mod common;

use atelier_db::models::audit::CreateAuditLog;
use atelier_db::repositories::AuditLogRepo;
use atelier_events::messages;
use atelier_events::Notifier;
use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, patch_auth, post_json_auth, put_json_auth, token_for,
    TEST_PASSWORD,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_platform_stats_counts_users_by_role(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;
    create_user(&pool, "c1@example.com", "customer").await;
    create_user(&pool, "c2@example.com", "customer").await;
    create_user(&pool, "tailor@example.com", "tailor").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/stats", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["users"]["total"], 4);
    let customers = json["data"]["users"]["by_role"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["key"] == "customer")
        .unwrap()
        .clone();
    assert_eq!(customers["count"], 2);
    assert_eq!(json["data"]["appointments"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_reject_other_roles(pool: PgPool) {
    let staff = create_user(&pool, "staff@example.com", "staff").await;

    for uri in ["/api/v1/admin/stats", "/api/v1/admin/users", "/api/v1/audit-logs"] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, uri, &token_for(&staff)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_toggle_active_blocks_login(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let response = patch_auth(
        app,
        &format!("/api/v1/admin/users/{}/toggle-active", customer.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
    assert_eq!(json["data"]["message"], "User deactivated successfully");

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "customer@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The toggle was audited.
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/audit-logs?action=user.toggled_active",
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_log_pages_and_clamps(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;
    let token = token_for(&admin);
    for i in 1..=120 {
        AuditLogRepo::insert(
            &pool,
            &CreateAuditLog {
                user_id: Some(admin.id),
                action: "fabric.updated".into(),
                resource_type: Some("fabric".into()),
                resource_id: Some(i),
                details: None,
                ip_address: None,
                user_agent: None,
            },
        )
        .await
        .unwrap();
    }
    let base = "/api/v1/audit-logs?action=fabric.updated";

    // page=0 resolves to 1 and page_size=1000 to the 100 maximum.
    let app = common::build_test_app(pool.clone());
    let uri = format!("{base}&page=0&page_size=1000");
    let json = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_size"], 100);
    assert_eq!(json["total"], 120);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 100);
    assert_eq!(json["items"][0]["resource_id"], 120);
    assert_eq!(json["items"][0]["user_email"], "admin@example.com");

    // Third page of 50 starts at offset 100.
    let app = common::build_test_app(pool.clone());
    let uri = format!("{base}&page=3&page_size=50");
    let json = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(json["total_pages"], 3);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 20);
    assert_eq!(items[0]["resource_id"], 20);

    // Defaults.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, base, &token).await).await;
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_size"], 50);
    assert_eq!(json["items"].as_array().unwrap().len(), 50);

    // A huge page number is an empty page, not a server error.
    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("{base}&page={}", i64::MAX), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["total"], 120);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_toggle_self(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool);
    let response = patch_auth(
        app,
        &format!("/api/v1/admin/users/{}/toggle-active", admin.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_user_list_filters_by_role(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;
    create_user(&pool, "t1@example.com", "tailor").await;
    create_user(&pool, "t2@example.com", "tailor").await;
    create_user(&pool, "c1@example.com", "customer").await;

    let app = common::build_test_app(pool);
    let json = body_json(
        get_auth(app, "/api/v1/admin/users?role=tailor", &token_for(&admin)).await,
    )
    .await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "tailor"));
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revenue_report_defaults_to_thirty_days(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/analytics/revenue", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["period_days"], 30);
    assert_eq!(json["data"]["total_revenue"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analytics_rejects_out_of_range_period(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/analytics/order-trends?days=0",
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_search_is_for_workshop_roles(pool: PgPool) {
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let customer = create_user(&pool, "meera@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        "/api/v1/search/customers?q=meera",
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let hits = json["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], customer.id);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/search/customers?q=meera",
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_rejects_blank_term(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/search/orders?q=%20%20", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Tailor dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tailor_dashboard_is_tailor_only(pool: PgPool) {
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/tailor/stats", &token_for(&tailor)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_assigned"], 0);
    assert_eq!(json["data"]["pending"], 0);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/tailor/stats", &token_for(&customer)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_me_and_change_password(pool: PgPool) {
    let user = create_user(&pool, "self@example.com", "customer").await;
    let token = token_for(&user);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/users/me",
        serde_json::json!({ "full_name": "Renamed Person" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["full_name"], "Renamed Person");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/users/me/password",
        serde_json::json!({ "current_password": "wrong-password", "new_password": "brand-new-pw" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/users/me/password",
        serde_json::json!({ "current_password": TEST_PASSWORD, "new_password": "brand-new-pw" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customers_only_see_their_own_profile(pool: PgPool) {
    let first = create_user(&pool, "c1@example.com", "customer").await;
    let second = create_user(&pool, "c2@example.com", "customer").await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/users/{}", second.id),
        &token_for(&first),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Tailors may look up customers.
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/users/{}", second.id),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_inbox(pool: PgPool) {
    let user = create_user(&pool, "inbox@example.com", "customer").await;
    let other = create_user(&pool, "other@example.com", "customer").await;
    let token = token_for(&user);

    let notifier = Notifier::new(pool.clone(), None);
    let first = notifier
        .in_app(user.id, &messages::test_email(), None)
        .await
        .unwrap();
    notifier
        .in_app(user.id, &messages::test_email(), None)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["unread_count"], 2);

    let app = common::build_test_app(pool.clone());
    let response = patch_auth(
        app,
        &format!("/api/v1/notifications/{}/read", first.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_read"], true);

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(app, "/api/v1/notifications?unread_only=true", &token).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Someone else's notification looks missing.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/notifications/{}", first.id),
        &token_for(&other),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/notifications/read-all",
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["unread_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notifications_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
