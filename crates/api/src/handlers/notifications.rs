//! Handlers for the caller's notification inbox.
//!
//! Every query is scoped to the authenticated user; another user's
//! notification looks the same as a missing one.

use atelier_core::channels::{can_retry, is_unread, is_valid_channel, STATUS_FAILED};
use atelier_core::types::DbId;
use atelier_db::models::notification::{Notification, NotificationStats};
use atelier_db::repositories::NotificationRepo;
use atelier_events::messages;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const DEFAULT_NOTIFICATION_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    pub channel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    /// Defaults to the caller's own address.
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub is_read: bool,
    pub can_retry: bool,
}

impl From<Notification> for NotificationView {
    fn from(notification: Notification) -> Self {
        Self {
            is_read: !is_unread(&notification.channel, &notification.status),
            can_retry: can_retry(
                &notification.status,
                notification.retry_count,
                notification.max_retries,
            ),
            notification,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TestEmailResult {
    pub message: &'static str,
    pub notification_id: DbId,
    pub status: String,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
    Query(params): Query<NotificationListParams>,
) -> AppResult<Json<DataResponse<Vec<NotificationView>>>> {
    if let Some(channel) = params.channel.as_deref() {
        if !is_valid_channel(channel) {
            return Err(AppError::BadRequest(format!("Unknown channel '{channel}'")));
        }
    }
    let (limit, offset) = pagination.resolve(DEFAULT_NOTIFICATION_LIMIT);
    let items = NotificationRepo::list_for_user(
        &state.pool,
        auth_user.user_id,
        params.unread_only,
        params.channel.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse {
        data: items.into_iter().map(NotificationView::from).collect(),
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let unread_count = NotificationRepo::count_unread(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread_count },
    }))
}

/// GET /api/v1/notifications/stats
pub async fn notification_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<NotificationStats>>> {
    let stats = NotificationRepo::stats_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NotificationView>>> {
    let notification = NotificationRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|n| n.user_id == auth_user.user_id)
        .ok_or_else(|| AppError::not_found("Notification", id))?;
    Ok(Json(DataResponse {
        data: notification.into(),
    }))
}

/// PATCH /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NotificationView>>> {
    let notification = NotificationRepo::mark_read(&state.pool, id, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification", id))?;
    Ok(Json(DataResponse {
        data: notification.into(),
    }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, updated, "Notifications marked read");
    Ok(Json(MessageResponse::new("All notifications marked as read")))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !NotificationRepo::delete(&state.pool, id, auth_user.user_id).await? {
        return Err(AppError::not_found("Notification", id));
    }
    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}

/// POST /api/v1/notifications/test-email
///
/// Sends a test message through SMTP synchronously so the admin sees the
/// delivery result.
pub async fn send_test_email(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Option<Json<TestEmailRequest>>,
) -> AppResult<Json<DataResponse<TestEmailResult>>> {
    if !state.notifier.email_enabled() {
        return Err(AppError::BadRequest(
            "Email delivery is not configured".into(),
        ));
    }

    let mut recipient = load_user(&state, admin.user_id).await?;
    if let Some(email) = body
        .and_then(|Json(b)| b.email)
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
    {
        recipient.email = email;
    }
    if recipient.email.is_empty() {
        return Err(AppError::BadRequest(
            "No email address provided and current user has no email set.".into(),
        ));
    }

    let notification = state
        .notifier
        .email(&recipient, &messages::test_email(), None)
        .await?;
    if notification.status == STATUS_FAILED {
        tracing::error!(
            notification_id = notification.id,
            error = ?notification.error_message,
            "Test email failed"
        );
        return Err(AppError::InternalError("Failed to send test email".into()));
    }

    Ok(Json(DataResponse {
        data: TestEmailResult {
            message: "Test email sent successfully",
            notification_id: notification.id,
            status: notification.status,
        },
    }))
}
