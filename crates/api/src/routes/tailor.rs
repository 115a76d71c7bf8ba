//! Route definitions for the tailor dashboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::tailor;
use crate::state::AppState;

/// Routes mounted at `/tailor`. All require the `tailor` role.
///
/// ```text
/// GET /stats                           -> tailor_stats
/// GET /appointments                    -> tailor_appointments (?status, skip, limit)
/// GET /appointments/{id}/measurements  -> appointment_measurements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(tailor::tailor_stats))
        .route("/appointments", get(tailor::tailor_appointments))
        .route(
            "/appointments/{id}/measurements",
            get(tailor::appointment_measurements),
        )
}
