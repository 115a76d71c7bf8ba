//! The tailor's own dashboard. Every route requires the `tailor` role.

use atelier_core::types::{DbId, Timestamp};
use atelier_db::models::appointment::{Appointment, AppointmentFilter};
use atelier_db::models::measurement::ProfileWithVersion;
use atelier_db::models::stats::TailorDashboardStats;
use atelier_db::repositories::{AppointmentRepo, MeasurementRepo, StatsRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::appointments::load_appointment;
use crate::middleware::rbac::RequireTailor;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_TAILOR_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct TailorAppointmentParams {
    pub status: Option<String>,
}

/// The customer's measurements for one appointment. `profile` is `None`
/// when the customer has not recorded any.
#[derive(Debug, Serialize)]
pub struct AppointmentMeasurements {
    pub appointment_id: DbId,
    pub customer_id: DbId,
    pub profile: Option<ProfileWithVersion>,
}

/// UTC bounds of the current day and the Monday that starts its week.
fn dashboard_bounds(now: DateTime<Utc>) -> (Timestamp, Timestamp, Timestamp) {
    let today = now.date_naive();
    let day_start = today.and_time(NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);
    let offset = i64::from(today.weekday().num_days_from_monday());
    let week_start = day_start - Duration::days(offset);
    (day_start, day_end, week_start)
}

/// GET /api/v1/tailor/stats
pub async fn tailor_stats(
    State(state): State<AppState>,
    RequireTailor(tailor): RequireTailor,
) -> AppResult<Json<DataResponse<TailorDashboardStats>>> {
    let (day_start, day_end, week_start) = dashboard_bounds(Utc::now());
    let stats =
        StatsRepo::tailor_dashboard(&state.pool, tailor.user_id, day_start, day_end, week_start)
            .await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/tailor/appointments
pub async fn tailor_appointments(
    State(state): State<AppState>,
    RequireTailor(tailor): RequireTailor,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<TailorAppointmentParams>,
) -> AppResult<Json<DataResponse<Vec<Appointment>>>> {
    let (limit, offset) = pagination.resolve(DEFAULT_TAILOR_LIMIT);
    let filter = AppointmentFilter {
        tailor_id: Some(tailor.user_id),
        status: params.status,
        ..Default::default()
    };
    let appointments = AppointmentRepo::list(&state.pool, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data: appointments }))
}

/// GET /api/v1/tailor/appointments/{id}/measurements
///
/// The customer's default profile (or most recent one) with its current
/// version. Only the assigned tailor may look.
pub async fn appointment_measurements(
    State(state): State<AppState>,
    RequireTailor(tailor): RequireTailor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AppointmentMeasurements>>> {
    let appointment = load_appointment(&state, id).await?;
    if appointment.tailor_id != Some(tailor.user_id) {
        return Err(AppError::forbidden(
            "You can only view measurements for your own appointments",
        ));
    }

    let profile =
        match MeasurementRepo::find_default_for_customer(&state.pool, appointment.customer_id)
            .await?
        {
            Some(profile) => {
                let current = MeasurementRepo::current_version(&state.pool, &profile).await?;
                Some(ProfileWithVersion { profile, current })
            }
            None => None,
        };

    Ok(Json(DataResponse {
        data: AppointmentMeasurements {
            appointment_id: appointment.id,
            customer_id: appointment.customer_id,
            profile,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-14 is a Thursday.
        let now = Utc.with_ymd_and_hms(2024, 3, 14, 15, 30, 0).unwrap();
        let (day_start, day_end, week_start) = dashboard_bounds(now);
        assert_eq!(day_start, Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(day_end, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(week_start, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap();
        let (day_start, _, week_start) = dashboard_bounds(now);
        assert_eq!(day_start, week_start);
    }
}
