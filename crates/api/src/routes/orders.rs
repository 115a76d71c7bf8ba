//! Route definitions for the `/orders` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /       -> list_orders (role-scoped, ?status)
/// POST   /       -> create_order (admin/tailor)
/// GET    /{id}   -> get_order
/// PATCH  /{id}   -> update_order (admin/tailor)
/// DELETE /{id}   -> delete_order (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route(
            "/{id}",
            get(orders::get_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
}
