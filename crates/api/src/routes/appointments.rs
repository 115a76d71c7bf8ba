//! Route definitions for the `/appointments` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`.
///
/// ```text
/// GET    /                   -> list_appointments (role-scoped)
/// POST   /                   -> create_appointment
/// POST   /booking/validate   -> validate_booking_step
/// GET    /slots              -> get_slots (public)
/// GET    /{id}               -> get_appointment
/// PUT    /{id}               -> update_appointment
/// PUT    /{id}/reschedule    -> reschedule_appointment
/// POST   /{id}/cancel        -> cancel_appointment
/// PATCH  /{id}/status        -> update_appointment_status (tailor/admin/staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/booking/validate",
            post(appointments::validate_booking_step),
        )
        .route("/slots", get(appointments::get_slots))
        .route(
            "/{id}",
            get(appointments::get_appointment).put(appointments::update_appointment),
        )
        .route(
            "/{id}/reschedule",
            put(appointments::reschedule_appointment),
        )
        .route("/{id}/cancel", post(appointments::cancel_appointment))
        .route(
            "/{id}/status",
            patch(appointments::update_appointment_status),
        )
}
