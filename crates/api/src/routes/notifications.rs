//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /               -> list_notifications (?unread_only, channel, skip, limit)
/// GET    /unread-count   -> unread_count
/// GET    /stats          -> notification_stats
/// POST   /read-all       -> mark_all_read
/// POST   /test-email     -> send_test_email (admin)
/// GET    /{id}           -> get_notification
/// DELETE /{id}           -> delete_notification
/// PATCH  /{id}/read      -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/unread-count", get(notifications::unread_count))
        .route("/stats", get(notifications::notification_stats))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/test-email", post(notifications::send_test_email))
        .route(
            "/{id}",
            get(notifications::get_notification).delete(notifications::delete_notification),
        )
        .route("/{id}/read", patch(notifications::mark_read))
}
