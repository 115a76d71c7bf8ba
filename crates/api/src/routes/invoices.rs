//! Route definitions for the `/invoices` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /                -> list_invoices
/// POST   /                -> create_invoice (admin/staff)
/// GET    /{id}            -> get_invoice
/// POST   /{id}/payments   -> record_payment (admin/staff)
/// PATCH  /{id}/status     -> update_invoice_status (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/{id}", get(invoices::get_invoice))
        .route("/{id}/payments", post(invoices::record_payment))
        .route("/{id}/status", patch(invoices::update_invoice_status))
}
