//! Quick-search handlers used by the portal search boxes.
//!
//! Results are capped at [`SEARCH_LIMIT`] and scoped the same way as the
//! regular listings: customers see their own records, tailors those
//! assigned to them.

use atelier_core::roles::ROLE_CUSTOMER;
use atelier_db::models::appointment::{Appointment, AppointmentFilter};
use atelier_db::models::order::Order;
use atelier_db::models::user::UserResponse;
use atelier_db::repositories::{AppointmentRepo, OrderRepo, UserRepo};
use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireWorkshop;
use crate::response::DataResponse;
use crate::state::AppState;

pub const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

impl SearchQuery {
    fn term(&self) -> AppResult<&str> {
        let term = self.q.trim();
        if term.is_empty() {
            return Err(AppError::BadRequest("Search query must not be empty".into()));
        }
        Ok(term)
    }
}

#[derive(Debug, Deserialize)]
pub struct AppointmentSearchParams {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub appointment_type: Option<String>,
}

/// GET /api/v1/search/orders?q=
///
/// Matches order number, garment type and fabric details.
pub async fn search_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let term = query.term()?;
    let customer_id = auth_user.is_customer().then_some(auth_user.user_id);
    let tailor_id = auth_user.is_tailor().then_some(auth_user.user_id);
    let orders = OrderRepo::search(&state.pool, term, customer_id, tailor_id, SEARCH_LIMIT).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/search/customers?q=
pub async fn search_customers(
    State(state): State<AppState>,
    RequireWorkshop(_user): RequireWorkshop,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let term = query.term()?;
    let customers = UserRepo::search(&state.pool, ROLE_CUSTOMER, term, SEARCH_LIMIT).await?;
    Ok(Json(DataResponse {
        data: customers.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/search/appointments?date=&appointment_type=
pub async fn search_appointments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AppointmentSearchParams>,
) -> AppResult<Json<DataResponse<Vec<Appointment>>>> {
    let (from, to) = match params.date {
        Some(date) => {
            let start = date.and_time(NaiveTime::MIN).and_utc();
            (Some(start), Some(start + Duration::days(1)))
        }
        None => (None, None),
    };
    let filter = AppointmentFilter {
        customer_id: auth_user.is_customer().then_some(auth_user.user_id),
        tailor_id: auth_user.is_tailor().then_some(auth_user.user_id),
        appointment_type: params.appointment_type.filter(|t| !t.trim().is_empty()),
        from,
        to,
        ..Default::default()
    };
    let appointments = AppointmentRepo::list(&state.pool, &filter, SEARCH_LIMIT, 0).await?;
    Ok(Json(DataResponse { data: appointments }))
}
