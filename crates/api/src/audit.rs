//! Audit trail recording for handlers.
//!
//! Entries are written after the primary change succeeds. A failed audit
//! insert is logged and swallowed so it never fails the request.

use atelier_core::audit::redact_sensitive_fields;
use atelier_core::types::DbId;
use atelier_db::models::audit::CreateAuditLog;
use atelier_db::repositories::AuditLogRepo;
use atelier_db::DbPool;

use crate::middleware::client::ClientInfo;

/// One audit entry under construction.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    inner: CreateAuditLog,
}

impl AuditEntry {
    pub fn new(action: &str) -> Self {
        Self {
            inner: CreateAuditLog {
                action: action.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn user(mut self, user_id: DbId) -> Self {
        self.inner.user_id = Some(user_id);
        self
    }

    pub fn resource(mut self, resource_type: &str, resource_id: DbId) -> Self {
        self.inner.resource_type = Some(resource_type.to_string());
        self.inner.resource_id = Some(resource_id);
        self
    }

    /// Attach details. Sensitive keys are redacted before storage.
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.inner.details = Some(redact_sensitive_fields(&details));
        self
    }

    pub fn client(mut self, client: &ClientInfo) -> Self {
        self.inner.ip_address = client.ip_address.clone();
        self.inner.user_agent = client.user_agent.clone();
        self
    }

    /// Persist the entry.
    pub async fn record(self, pool: &DbPool) {
        if let Err(e) = AuditLogRepo::insert(pool, &self.inner).await {
            tracing::warn!(
                error = %e,
                action = %self.inner.action,
                "Failed to write audit log entry"
            );
        }
    }
}
