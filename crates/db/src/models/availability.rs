//! Weekly tailor availability windows.

use atelier_core::types::{DbId, Timestamp};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One weekday window for a tailor at a branch.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TailorAvailability {
    pub id: DbId,
    pub tailor_id: DbId,
    pub branch_id: DbId,
    /// Lowercase weekday name, e.g. `"monday"`.
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub buffer_time_minutes: i32,
    pub max_appointments_per_day: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing a window. Unique per tailor, branch and day.
#[derive(Debug, Clone)]
pub struct CreateAvailability {
    pub tailor_id: DbId,
    pub branch_id: DbId,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub buffer_time_minutes: i32,
    pub max_appointments_per_day: i32,
}
