//! HTTP-level integration tests for availability, slots and the booking
//! lifecycle.

mod common;

use atelier_db::models::branch::{Branch, CreateBranch};
use atelier_db::repositories::BranchRepo;
use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, patch_json_auth, post_json_auth, put_json_auth,
    token_for,
};
use sqlx::PgPool;

/// A Monday, far enough out to never be in the past.
const MONDAY: &str = "2030-03-04";

async fn create_branch(pool: &PgPool) -> Branch {
    BranchRepo::create(
        pool,
        &CreateBranch {
            name: "Main Street".into(),
            code: "MAIN".into(),
            address: "1 Main Street".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
            phone: None,
            email: None,
        },
    )
    .await
    .expect("branch creation should succeed")
}

/// Open a 10:00-12:00 Monday window for the tailor (four 30-minute slots).
async fn open_monday(pool: &PgPool, tailor_token: &str, branch_id: i64) {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/availability",
        serde_json::json!({
            "branch_id": branch_id,
            "day_of_week": "Monday",
            "start_time": "10:00:00",
            "end_time": "12:00:00",
            "slot_duration_minutes": 30,
        }),
        tailor_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn booking(branch_id: i64, tailor_id: i64, time: &str) -> serde_json::Value {
    serde_json::json!({
        "appointment_type": "measurement",
        "branch_id": branch_id,
        "tailor_id": tailor_id,
        "date": MONDAY,
        "time": time,
        "duration_minutes": 30,
        "customer_notes": "First fitting",
    })
}

// ---------------------------------------------------------------------------
// Availability and slots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_slots_reflect_bookings(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;
    open_monday(&pool, &token_for(&tailor), branch.id).await;

    let slots_uri = format!(
        "/api/v1/appointments/slots?tailor_id={}&branch_id={}&date={MONDAY}",
        tailor.id, branch.id
    );

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &slots_uri).await).await;
    let slots = json["data"]["available_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 4);
    assert!(slots.iter().all(|s| s["is_available"] == true));

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        booking(branch.id, tailor.id, "10:00:00"),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &slots_uri).await).await;
    let slots = json["data"]["available_slots"].as_array().unwrap();
    assert_eq!(slots[0]["is_available"], false);
    assert_eq!(slots[1]["is_available"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tailor_cannot_set_another_tailors_availability(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "t1@example.com", "tailor").await;
    let other = create_user(&pool, "t2@example.com", "tailor").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/availability",
        serde_json::json!({
            "tailor_id": other.id,
            "branch_id": branch.id,
            "day_of_week": "tuesday",
            "start_time": "09:00:00",
            "end_time": "17:00:00",
        }),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_availability_rejects_inverted_window(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/availability",
        serde_json::json!({
            "branch_id": branch.id,
            "day_of_week": "monday",
            "start_time": "17:00:00",
            "end_time": "09:00:00",
        }),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_booking_conflicts(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let first = create_user(&pool, "c1@example.com", "customer").await;
    let second = create_user(&pool, "c2@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        booking(branch.id, tailor.id, "10:00:00"),
        &token_for(&first),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        booking(branch.id, tailor.id, "10:15:00"),
        &token_for(&second),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Time slot already booked");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_with_unknown_tailor_is_404(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        booking(branch.id, 999_999, "10:00:00"),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_incomplete_booking_is_rejected(pool: PgPool) {
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        serde_json::json!({ "appointment_type": "fitting" }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wizard_step_validation_reports_next_step(pool: PgPool) {
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/appointments/booking/validate",
        serde_json::json!({ "step": 1, "appointment_type": "fitting", "branch_id": 1 }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["valid"], true);
    assert_eq!(json["data"]["next_step"], 2);
}

// ---------------------------------------------------------------------------
// Access and lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_longer_duration_conflicts_with_next_booking(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let first = create_user(&pool, "c1@example.com", "customer").await;
    let second = create_user(&pool, "c2@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        post_json_auth(
            app,
            "/api/v1/appointments",
            booking(branch.id, tailor.id, "10:00:00"),
            &token_for(&first),
        )
        .await,
    )
    .await;
    let uri = format!("/api/v1/appointments/{}", json["data"]["id"].as_i64().unwrap());

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/appointments",
        booking(branch.id, tailor.id, "11:00:00"),
        &token_for(&second),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &uri,
        serde_json::json!({ "duration_minutes": 120 }),
        &token_for(&first),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Time slot already booked");

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &uri,
        serde_json::json!({ "duration_minutes": 60 }),
        &token_for(&first),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["duration_minutes"], 60);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_the_customer_edits_customer_notes(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        post_json_auth(
            app,
            "/api/v1/appointments",
            booking(branch.id, tailor.id, "10:00:00"),
            &token_for(&customer),
        )
        .await,
    )
    .await;
    let uri = format!("/api/v1/appointments/{}", json["data"]["id"].as_i64().unwrap());

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &uri,
        serde_json::json!({
            "customer_notes": "Overwritten by tailor",
            "tailor_notes": "Bring the sample kurta",
        }),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer_notes"], "First fitting");
    assert_eq!(json["data"]["tailor_notes"], "Bring the sample kurta");

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &uri,
        serde_json::json!({ "customer_notes": "Prefer mornings" }),
        &token_for(&customer),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer_notes"], "Prefer mornings");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_appointment_lifecycle(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let customer = create_user(&pool, "customer@example.com", "customer").await;
    let stranger = create_user(&pool, "stranger@example.com", "customer").await;

    let app = common::build_test_app(pool.clone());
    let created = body_json(
        post_json_auth(
            app,
            "/api/v1/appointments",
            booking(branch.id, tailor.id, "11:00:00"),
            &token_for(&customer),
        )
        .await,
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status"], "pending");

    // Another customer cannot see it.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/appointments/{id}"),
        &token_for(&stranger),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Customers cannot drive the status.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/appointments/{id}/status"),
        serde_json::json!({ "status": "confirmed" }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The assigned tailor confirms.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/appointments/{id}/status"),
        serde_json::json!({ "status": "confirmed" }),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "confirmed");

    // pending is not reachable from confirmed.
    let app = common::build_test_app(pool.clone());
    let response = patch_json_auth(
        app,
        &format!("/api/v1/appointments/{id}/status"),
        serde_json::json!({ "status": "pending" }),
        &token_for(&tailor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The customer cancels with a reason.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/appointments/{id}/cancel"),
        serde_json::json!({ "cancellation_reason": "Travelling that week" }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A cancelled appointment cannot be cancelled again.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/appointments/{id}/cancel"),
        serde_json::json!({ "cancellation_reason": "Again" }),
        &token_for(&customer),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_is_role_scoped(pool: PgPool) {
    let branch = create_branch(&pool).await;
    let tailor = create_user(&pool, "tailor@example.com", "tailor").await;
    let first = create_user(&pool, "c1@example.com", "customer").await;
    let second = create_user(&pool, "c2@example.com", "customer").await;
    let admin = create_user(&pool, "admin@example.com", "admin").await;

    for (customer, time) in [(&first, "10:00:00"), (&second, "11:00:00")] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            "/api/v1/appointments",
            booking(branch.id, tailor.id, time),
            &token_for(customer),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/appointments", &token_for(&first)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/appointments", &token_for(&tailor)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/appointments", &token_for(&admin)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
