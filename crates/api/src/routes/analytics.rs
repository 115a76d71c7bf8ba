//! Route definitions for `/analytics` (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
///
/// ```text
/// GET /revenue              -> revenue (?days, default 30)
/// GET /popular-fabrics      -> popular_fabrics (top 10)
/// GET /tailor-performance   -> tailor_performance
/// GET /order-trends         -> order_trends (?days, default 30)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(analytics::revenue))
        .route("/popular-fabrics", get(analytics::popular_fabrics))
        .route("/tailor-performance", get(analytics::tailor_performance))
        .route("/order-trends", get(analytics::order_trends))
}
