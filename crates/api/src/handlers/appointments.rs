//! Handlers for the `/appointments` resource.
//!
//! Booking goes through the four-step wizard in `atelier_core::booking`;
//! creation and rescheduling hold the tailor row lock while checking for
//! overlapping bookings.

use atelier_core::appointment::{
    validate_cancellation_reason, validate_duration, validate_transition, AppointmentStatus,
    MAX_CUSTOMER_NOTES_LEN,
};
use atelier_core::audit::{actions, resources};
use atelier_core::booking::{BookingDraft, BookingStep, BookingWizard};
use atelier_core::roles::ROLE_TAILOR;
use atelier_core::scheduling::{day_name, generate_slots, TimeSlot};
use atelier_core::types::{DbId, Timestamp};
use atelier_db::models::appointment::{
    Appointment, AppointmentFilter, CreateAppointment, UpdateAppointment,
};
use atelier_db::repositories::{AppointmentRepo, AvailabilityRepo, UserRepo};
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireWorkshop;
use crate::query::{PaginationParams, DEFAULT_LIMIT};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /appointments/booking/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateStepRequest {
    pub step: u8,
    #[serde(flatten)]
    pub draft: BookingDraft,
}

#[derive(Debug, Serialize)]
pub struct StepValidation {
    pub step: u8,
    pub valid: bool,
    pub missing: Vec<&'static str>,
    /// Step the wizard moves to; unchanged when the step is invalid.
    pub next_step: u8,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListParams {
    pub status: Option<String>,
    pub from_date: Option<Timestamp>,
    pub to_date: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub customer_notes: Option<String>,
    pub tailor_notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub new_scheduled_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub cancellation_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotParams {
    pub tailor_id: DbId,
    pub branch_id: DbId,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub tailor_id: DbId,
    pub branch_id: DbId,
    pub available_slots: Vec<TimeSlot>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn load_appointment(state: &AppState, id: DbId) -> AppResult<Appointment> {
    AppointmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))
}

/// Customers see their own appointments, tailors those assigned to them.
fn ensure_can_view(auth_user: &AuthUser, appt: &Appointment) -> AppResult<()> {
    let allowed = if auth_user.is_customer() {
        appt.customer_id == auth_user.user_id
    } else if auth_user.is_tailor() {
        appt.tailor_id == Some(auth_user.user_id)
    } else {
        auth_user.sees_all()
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden("Not authorized to view this appointment"))
    }
}

/// Customers may only change their own appointments.
fn ensure_can_modify(auth_user: &AuthUser, appt: &Appointment) -> AppResult<()> {
    if auth_user.is_customer() && appt.customer_id != auth_user.user_id {
        return Err(AppError::forbidden("Not authorized to modify this appointment"));
    }
    if auth_user.is_tailor() && appt.tailor_id != Some(auth_user.user_id) {
        return Err(AppError::forbidden("Not authorized to modify this appointment"));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> AppResult<()> {
    if notes.is_some_and(|n| n.chars().count() > MAX_CUSTOMER_NOTES_LEN) {
        return Err(AppError::BadRequest(format!(
            "Notes must be at most {MAX_CUSTOMER_NOTES_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

/// POST /api/v1/appointments/booking/validate
///
/// Check one wizard step and report which step the client should show next.
pub async fn validate_booking_step(
    _auth_user: AuthUser,
    Json(input): Json<ValidateStepRequest>,
) -> AppResult<Json<DataResponse<StepValidation>>> {
    let step = BookingStep::from_number(input.step)?;
    let missing = input.draft.missing_fields(step);
    let mut wizard = BookingWizard::at(step, input.draft);
    let valid = wizard.next().is_ok();

    Ok(Json(DataResponse {
        data: StepValidation {
            step: step.to_number(),
            valid,
            missing,
            next_step: wizard.step().to_number(),
        },
    }))
}

/// POST /api/v1/appointments
///
/// The caller books for themselves. Every wizard step must validate, and the
/// tailor must be free for the whole requested interval.
pub async fn create_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Json(draft): Json<BookingDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<Appointment>>)> {
    let request = BookingWizard::new(draft).into_request()?;
    let customer = load_user(&state, auth_user.user_id).await?;

    let tailor_ok = UserRepo::find_by_id(&state.pool, request.tailor_id)
        .await?
        .is_some_and(|t| t.role == ROLE_TAILOR && t.is_active);
    if !tailor_ok {
        return Err(AppError::not_found("Tailor", request.tailor_id));
    }

    let input = CreateAppointment {
        customer_id: customer.id,
        tailor_id: Some(request.tailor_id),
        branch_id: request.branch_id,
        appointment_type: request.appointment_type.as_str().to_string(),
        scheduled_at: request.scheduled_at.and_utc(),
        duration_minutes: request.duration_minutes,
        is_priority: request.is_priority || customer.is_priority,
        is_rush: request.is_rush,
        customer_notes: request.customer_notes,
    };
    let appointment = AppointmentRepo::create_if_free(&state.pool, &input)
        .await?
        .ok_or_else(|| AppError::conflict("Time slot already booked"))?;

    tracing::info!(
        appointment_id = appointment.id,
        customer_id = customer.id,
        tailor_id = request.tailor_id,
        scheduled_at = %appointment.scheduled_at,
        "Appointment booked"
    );
    AuditEntry::new(actions::APPOINTMENT_CREATED)
        .user(customer.id)
        .resource(resources::APPOINTMENT, appointment.id)
        .details(serde_json::json!({
            "appointment_type": appointment.appointment_type,
            "scheduled_at": appointment.scheduled_at,
            "tailor_id": appointment.tailor_id,
        }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(actions::APPOINTMENT_CREATED)
            .with_source(resources::APPOINTMENT, appointment.id)
            .with_actor(customer.id),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: appointment }),
    ))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<AppointmentListParams>,
) -> AppResult<Json<DataResponse<Vec<Appointment>>>> {
    let status = params
        .status
        .as_deref()
        .map(AppointmentStatus::parse)
        .transpose()?;

    let mut filter = AppointmentFilter {
        status: status.map(|s| s.as_str().to_string()),
        from: params.from_date,
        to: params.to_date,
        ..Default::default()
    };
    if auth_user.is_customer() {
        filter.customer_id = Some(auth_user.user_id);
    } else if auth_user.is_tailor() {
        filter.tailor_id = Some(auth_user.user_id);
    }

    let (limit, offset) = pagination.resolve(DEFAULT_LIMIT);
    let appointments = AppointmentRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// GET /api/v1/appointments/slots
///
/// Public. Returns an empty list when the tailor has no window on that weekday.
pub async fn get_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotParams>,
) -> AppResult<Json<DataResponse<SlotsResponse>>> {
    let window = AvailabilityRepo::find_for_day(
        &state.pool,
        params.tailor_id,
        params.branch_id,
        day_name(params.date),
    )
    .await?
    .filter(|w| w.is_active);

    let available_slots = match window {
        Some(window) => {
            let day_start = params.date.and_time(window.start_time).and_utc();
            let day_end = params.date.and_time(window.end_time).and_utc();
            let booked: Vec<_> = AppointmentRepo::list_booked_for_tailor(
                &state.pool,
                params.tailor_id,
                day_start,
                day_end,
            )
            .await?
            .iter()
            .map(Appointment::booked_interval)
            .collect();
            generate_slots(
                params.date,
                window.start_time,
                window.end_time,
                window.slot_duration_minutes,
                &booked,
            )
        }
        None => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: SlotsResponse {
            date: params.date,
            tailor_id: params.tailor_id,
            branch_id: params.branch_id,
            available_slots,
        },
    }))
}

/// GET /api/v1/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_view(&auth_user, &appointment)?;
    Ok(Json(DataResponse { data: appointment }))
}

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// PUT /api/v1/appointments/{id}
///
/// Customer notes are only accepted from the owning customer; tailor notes
/// only from tailors and admins. A new duration is checked against the
/// tailor's other bookings and returns 409 on a clash.
pub async fn update_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAppointmentRequest>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_modify(&auth_user, &appointment)?;

    if let Some(minutes) = input.duration_minutes {
        validate_duration(minutes)?;
    }
    validate_notes(input.customer_notes.as_deref())?;
    validate_notes(input.tailor_notes.as_deref())?;

    let customer_notes = if appointment.customer_id == auth_user.user_id {
        input.customer_notes
    } else {
        None
    };
    let tailor_notes = if auth_user.is_tailor() || auth_user.is_admin() {
        input.tailor_notes
    } else {
        None
    };
    let update = UpdateAppointment {
        customer_notes,
        tailor_notes,
        duration_minutes: input.duration_minutes,
    };

    let updated = AppointmentRepo::update_if_free(&state.pool, &appointment, &update)
        .await?
        .ok_or_else(|| AppError::conflict("Time slot already booked"))?;
    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/appointments/{id}/reschedule
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<RescheduleRequest>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = load_appointment(&state, id).await?;
    ensure_can_modify(&auth_user, &appointment)?;

    let status = AppointmentStatus::parse(&appointment.status)?;
    if !status.can_reschedule() {
        return Err(AppError::BadRequest(
            "Appointment cannot be rescheduled".into(),
        ));
    }

    let previous = appointment.scheduled_at;
    let updated =
        AppointmentRepo::reschedule_if_free(&state.pool, &appointment, input.new_scheduled_at)
            .await?
            .ok_or_else(|| AppError::conflict("Time slot already booked"))?;

    tracing::info!(
        appointment_id = id,
        from = %previous,
        to = %updated.scheduled_at,
        "Appointment rescheduled"
    );
    AuditEntry::new(actions::APPOINTMENT_RESCHEDULED)
        .user(auth_user.user_id)
        .resource(resources::APPOINTMENT, id)
        .details(serde_json::json!({
            "previous_scheduled_at": previous,
            "new_scheduled_at": updated.scheduled_at,
        }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(actions::APPOINTMENT_STATUS_CHANGED)
            .with_source(resources::APPOINTMENT, id)
            .with_actor(auth_user.user_id),
    );

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/appointments/{id}/cancel
pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<Json<MessageResponse>> {
    let appointment = load_appointment(&state, id).await?;

    let status = AppointmentStatus::parse(&appointment.status)?;
    if !status.can_cancel() {
        return Err(AppError::BadRequest(
            "Appointment cannot be cancelled".into(),
        ));
    }
    ensure_can_modify(&auth_user, &appointment)?;
    validate_cancellation_reason(&input.cancellation_reason)?;

    let reason = input.cancellation_reason.trim();
    AppointmentRepo::cancel(&state.pool, id, reason)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))?;

    tracing::info!(appointment_id = id, user_id = auth_user.user_id, "Appointment cancelled");
    AuditEntry::new(actions::APPOINTMENT_CANCELLED)
        .user(auth_user.user_id)
        .resource(resources::APPOINTMENT, id)
        .details(serde_json::json!({ "reason": reason }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(actions::APPOINTMENT_CANCELLED)
            .with_source(resources::APPOINTMENT, id)
            .with_actor(auth_user.user_id),
    );

    Ok(Json(MessageResponse::new("Appointment cancelled successfully")))
}

/// PATCH /api/v1/appointments/{id}/status
pub async fn update_appointment_status(
    State(state): State<AppState>,
    RequireWorkshop(user): RequireWorkshop,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<StatusUpdateRequest>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    let appointment = load_appointment(&state, id).await?;
    if user.is_tailor() && appointment.tailor_id != Some(user.user_id) {
        return Err(AppError::forbidden(
            "You can only update your own appointments",
        ));
    }

    let from = AppointmentStatus::parse(&appointment.status)?;
    let to = AppointmentStatus::parse(&input.status)?;
    validate_transition(from, to)?;
    validate_notes(input.notes.as_deref())?;

    let updated = AppointmentRepo::update_status(
        &state.pool,
        id,
        to.as_str(),
        input.notes.as_deref().filter(|n| !n.trim().is_empty()),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Appointment", id))?;

    tracing::info!(
        appointment_id = id,
        from = from.as_str(),
        to = to.as_str(),
        "Appointment status changed"
    );
    AuditEntry::new(actions::APPOINTMENT_STATUS_CHANGED)
        .user(user.user_id)
        .resource(resources::APPOINTMENT, id)
        .details(serde_json::json!({ "from": from.as_str(), "to": to.as_str() }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(actions::APPOINTMENT_STATUS_CHANGED)
            .with_source(resources::APPOINTMENT, id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "from": from.as_str(), "to": to.as_str() })),
    );

    Ok(Json(DataResponse { data: updated }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn appointment(customer_id: DbId, tailor_id: Option<DbId>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: 1,
            customer_id,
            tailor_id,
            branch_id: 1,
            appointment_type: "measurement".into(),
            status: "pending".into(),
            scheduled_at: now,
            duration_minutes: 30,
            is_priority: false,
            is_rush: false,
            rush_fee: None,
            customer_notes: None,
            tailor_notes: None,
            cancellation_reason: None,
            confirmation_sent: false,
            reminder_sent: false,
            original_appointment_id: None,
            reschedule_count: 0,
            cancelled_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: DbId, role: &str) -> AuthUser {
        AuthUser {
            user_id: id,
            role: role.to_string(),
        }
    }

    #[test]
    fn customers_only_see_their_own_appointments() {
        let appt = appointment(10, Some(20));
        assert!(ensure_can_view(&user(10, "customer"), &appt).is_ok());
        assert!(ensure_can_view(&user(11, "customer"), &appt).is_err());
    }

    #[test]
    fn tailors_see_assigned_appointments_and_staff_see_all() {
        let appt = appointment(10, Some(20));
        assert!(ensure_can_view(&user(20, "tailor"), &appt).is_ok());
        assert!(ensure_can_view(&user(21, "tailor"), &appt).is_err());
        assert!(ensure_can_view(&user(99, "staff"), &appt).is_ok());
        assert!(ensure_can_view(&user(98, "admin"), &appt).is_ok());
    }

    #[test]
    fn overlong_notes_are_rejected() {
        let long = "x".repeat(MAX_CUSTOMER_NOTES_LEN + 1);
        assert!(validate_notes(Some(&long)).is_err());
        assert!(validate_notes(Some("ok")).is_ok());
        assert!(validate_notes(None).is_ok());
    }
}
