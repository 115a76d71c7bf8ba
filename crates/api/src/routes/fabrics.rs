//! Route definitions for the `/fabrics` catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::fabrics;
use crate::state::AppState;

/// Routes mounted at `/fabrics`.
///
/// ```text
/// GET    /       -> list_fabrics (public)
/// POST   /       -> create_fabric (admin/tailor)
/// GET    /{id}   -> get_fabric (public)
/// PUT    /{id}   -> update_fabric (admin/tailor)
/// DELETE /{id}   -> delete_fabric (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(fabrics::list_fabrics).post(fabrics::create_fabric))
        .route(
            "/{id}",
            get(fabrics::get_fabric)
                .put(fabrics::update_fabric)
                .delete(fabrics::delete_fabric),
        )
}
