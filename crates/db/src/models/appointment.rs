//! Appointment entity model and DTOs.

use atelier_core::scheduling::BookedInterval;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Appointment {
    pub id: DbId,
    pub customer_id: DbId,
    pub tailor_id: Option<DbId>,
    pub branch_id: DbId,
    pub appointment_type: String,
    pub status: String,
    pub scheduled_at: Timestamp,
    pub duration_minutes: i32,
    pub is_priority: bool,
    pub is_rush: bool,
    pub rush_fee: Option<f64>,
    pub customer_notes: Option<String>,
    pub tailor_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub confirmation_sent: bool,
    pub reminder_sent: bool,
    pub original_appointment_id: Option<DbId>,
    pub reschedule_count: i32,
    pub cancelled_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Appointment {
    /// The interval this appointment occupies on its tailor's calendar.
    pub fn booked_interval(&self) -> BookedInterval {
        BookedInterval {
            start: self.scheduled_at,
            duration_minutes: self.duration_minutes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub customer_id: DbId,
    pub tailor_id: Option<DbId>,
    pub branch_id: DbId,
    pub appointment_type: String,
    pub scheduled_at: Timestamp,
    pub duration_minutes: i32,
    pub is_priority: bool,
    pub is_rush: bool,
    pub customer_notes: Option<String>,
}

/// Note and duration edits. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAppointment {
    pub customer_notes: Option<String>,
    pub tailor_notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// Role scoping and filters for appointment listings.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub customer_id: Option<DbId>,
    pub tailor_id: Option<DbId>,
    pub branch_id: Option<DbId>,
    pub status: Option<String>,
    pub appointment_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
