//! Audit log entity models and DTOs.
//!
//! Rows are append-only; `updated_at` exists only for schema uniformity.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit log entry, enriched with the acting user's identity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateAuditLog {
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<DbId>,
    /// Already redacted by the caller.
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Filters for the audit listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub action: Option<String>,
    pub user_id: Option<DbId>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct AuditStats {
    pub total_logs: i64,
    pub unique_actions: i64,
    pub recent_activity_24h: i64,
}
