pub mod admin;
pub mod analytics;
pub mod appointments;
pub mod audit;
pub mod auth;
pub mod branches;
pub mod fabrics;
pub mod health;
pub mod invoices;
pub mod measurements;
pub mod notifications;
pub mod orders;
pub mod search;
pub mod tailor;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   customer sign-up (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user
/// /auth/password-reset                             reset request (public)
/// /tailors/register                                tailor application (public)
///
/// /users                                           list (admin/staff)
/// /users/me                                        get, update
/// /users/me/password                               change password (POST)
/// /users/{id}                                      get, update, delete
///
/// /branches                                        list (public), create
/// /branches/{id}                                   get (public), update, deactivate
/// /branches/{id}/availability                      weekly windows (public)
/// /availability                                    set window (POST)
/// /availability/{id}                               remove window (DELETE)
///
/// /appointments                                    list, book
/// /appointments/booking/validate                   wizard step check (POST)
/// /appointments/slots                              free slots (public)
/// /appointments/{id}                               get, update
/// /appointments/{id}/reschedule                    reschedule (PUT)
/// /appointments/{id}/cancel                        cancel (POST)
/// /appointments/{id}/status                        status change (PATCH)
///
/// /orders                                          list, create
/// /orders/{id}                                     get, update (PATCH), delete
///
/// /invoices                                        list, create
/// /invoices/{id}                                   get
/// /invoices/{id}/payments                          record payment (POST)
/// /invoices/{id}/status                            set status (PATCH)
///
/// /measurements/profiles                           list, create
/// /measurements/profiles/{id}                      get, update, delete
/// /measurements/profiles/{id}/versions             list, add
/// /measurements/profiles/{id}/compare              diff two versions
/// /measurements/profiles/{id}/approve              review (POST)
/// /measurements/profiles/{id}/fit-recommendation   size suggestion
///
/// /fabrics                                         list (public), create
/// /fabrics/{id}                                    get (public), update, delete
///
/// /notifications                                   list (?unread_only, channel)
/// /notifications/unread-count                      unread count
/// /notifications/stats                             per-status counts
/// /notifications/read-all                          mark all read (POST)
/// /notifications/test-email                        SMTP check (POST, admin)
/// /notifications/{id}                              get, delete
/// /notifications/{id}/read                         mark read (PATCH)
///
/// /audit-logs                                      query (admin)
/// /audit-logs/stats                                summary (admin)
///
/// /admin/stats                                     platform counters
/// /admin/users                                     list
/// /admin/users/{id}/toggle-active                  flip is_active (PATCH)
/// /admin/appointments                              list
/// /admin/tailor-applications                       pending tailors
/// /admin/tailor-applications/{id}                  get
/// /admin/tailor-applications/{id}/approve          approve (POST)
/// /admin/tailor-applications/{id}/reject           reject (POST)
///
/// /analytics/revenue                               revenue summary (?days)
/// /analytics/popular-fabrics                       top fabrics
/// /analytics/tailor-performance                    completion rates
/// /analytics/order-trends                          orders by status (?days)
///
/// /tailor/stats                                    tailor dashboard counters
/// /tailor/appointments                             assigned appointments
/// /tailor/appointments/{id}/measurements           customer measurements
///
/// /search/orders                                   ?q=
/// /search/customers                                ?q=
/// /search/appointments                             ?date=&appointment_type=
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and self-registration.
        .nest("/auth", auth::router())
        .nest("/tailors", auth::tailors_router())
        // Accounts.
        .nest("/users", users::router())
        // Branches and tailor availability.
        .nest("/branches", branches::router())
        .nest("/availability", branches::availability_router())
        // Booking, workshop orders and billing.
        .nest("/appointments", appointments::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        // Measurement profiles and fabric catalog.
        .nest("/measurements", measurements::router())
        .nest("/fabrics", fabrics::router())
        // Inbox.
        .nest("/notifications", notifications::router())
        // Admin surfaces.
        .nest("/audit-logs", audit::router())
        .nest("/admin", admin::router())
        .nest("/analytics", analytics::router())
        // Tailor dashboard.
        .nest("/tailor", tailor::router())
        // Quick search.
        .nest("/search", search::router())
}
