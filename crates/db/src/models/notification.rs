//! Notification model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub channel: String,
    pub status: String,
    pub subject: Option<String>,
    pub message: String,
    pub template_name: Option<String>,
    pub related_resource_type: Option<String>,
    pub related_resource_id: Option<DbId>,
    pub recipient_address: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub failed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub channel: String,
    pub status: String,
    pub subject: Option<String>,
    pub message: String,
    pub template_name: Option<String>,
    pub related_resource_type: Option<String>,
    pub related_resource_id: Option<DbId>,
    pub recipient_address: Option<String>,
}

/// Per-user counters for the notification stats endpoint.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub sent: i64,
    pub failed: i64,
}
