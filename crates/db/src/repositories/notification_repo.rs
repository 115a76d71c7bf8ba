//! Repository for the `notifications` table.

use atelier_core::channels::{CHANNEL_IN_APP, STATUS_DELIVERED};
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{CreateNotification, Notification, NotificationStats};

const COLUMNS: &str = "id, user_id, channel, status, subject, message, template_name, \
                       related_resource_type, related_resource_id, recipient_address, \
                       sent_at, delivered_at, failed_at, error_message, retry_count, \
                       max_retries, created_at, updated_at";

/// Provides CRUD and delivery-state operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification. Rows created as `sent` are stamped with `sent_at`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications
                (user_id, channel, status, subject, message, template_name,
                 related_resource_type, related_resource_id, recipient_address, sent_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                     CASE WHEN $3 = 'sent' THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(&input.channel)
            .bind(&input.status)
            .bind(&input.subject)
            .bind(&input.message)
            .bind(&input.template_name)
            .bind(&input.related_resource_type)
            .bind(input.related_resource_id)
            .bind(&input.recipient_address)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        channel: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
               AND ($2 = false OR (channel = '{CHANNEL_IN_APP}' AND status <> '{STATUS_DELIVERED}'))
               AND ($3::TEXT IS NULL OR channel = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(channel)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_unread(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM notifications
             WHERE user_id = $1 AND channel = '{CHANNEL_IN_APP}' AND status <> '{STATUS_DELIVERED}'"
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn stats_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<NotificationStats, sqlx::Error> {
        let query = format!(
            "SELECT
                COUNT(*)::BIGINT AS total,
                COUNT(*) FILTER (WHERE channel = '{CHANNEL_IN_APP}'
                                   AND status <> '{STATUS_DELIVERED}')::BIGINT AS unread,
                COUNT(*) FILTER (WHERE status IN ('sent', 'delivered'))::BIGINT AS sent,
                COUNT(*) FILTER (WHERE status = 'failed')::BIGINT AS failed
             FROM notifications
             WHERE user_id = $1"
        );
        sqlx::query_as::<_, NotificationStats>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Mark one of the user's notifications as read (`delivered`).
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET
                status = '{STATUS_DELIVERED}',
                delivered_at = COALESCE(delivered_at, NOW())
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark every unread in-app notification of the user as read. Returns the count.
    pub async fn mark_all_read(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET status = '{STATUS_DELIVERED}', delivered_at = NOW()
             WHERE user_id = $1 AND channel = '{CHANNEL_IN_APP}' AND status <> '{STATUS_DELIVERED}'"
        );
        let result = sqlx::query(&query).bind(user_id).execute(pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'sent', sent_at = NOW(), error_message = NULL
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a failed delivery attempt.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET
                status = 'failed',
                failed_at = NOW(),
                error_message = $2,
                retry_count = retry_count + 1
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one of the user's notifications.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
