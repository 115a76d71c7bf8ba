//! Route definitions for quick search.

use axum::routing::get;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Routes mounted at `/search`.
///
/// ```text
/// GET /orders?q=                               -> search_orders (role-scoped)
/// GET /customers?q=                            -> search_customers (admin/tailor/staff)
/// GET /appointments?date=&appointment_type=    -> search_appointments (role-scoped)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(search::search_orders))
        .route("/customers", get(search::search_customers))
        .route("/appointments", get(search::search_appointments))
}
