//! Audit logging constants and utility functions.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and the background services.

// ---------------------------------------------------------------------------
// Action constants
// ---------------------------------------------------------------------------

/// Known actions for audit log entries (`<resource>.<verb>`).
pub mod actions {
    pub const USER_REGISTER: &str = "user.register";
    pub const USER_LOGIN: &str = "user.login";
    pub const USER_LOGIN_FAILED: &str = "user.login_failed";
    pub const USER_LOGOUT: &str = "user.logout";
    pub const USER_PASSWORD_CHANGED: &str = "user.password_changed";
    pub const USER_UPDATED: &str = "user.updated";
    pub const USER_DELETED: &str = "user.deleted";
    pub const USER_TOGGLED_ACTIVE: &str = "user.toggled_active";
    pub const TAILOR_REGISTERED: &str = "tailor.registered";
    pub const TAILOR_APPROVED: &str = "tailor.approved";
    pub const TAILOR_REJECTED: &str = "tailor.rejected";
    pub const APPOINTMENT_CREATED: &str = "appointment.created";
    pub const APPOINTMENT_RESCHEDULED: &str = "appointment.rescheduled";
    pub const APPOINTMENT_CANCELLED: &str = "appointment.cancelled";
    pub const APPOINTMENT_STATUS_CHANGED: &str = "appointment.status_changed";
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_UPDATED: &str = "order.updated";
    pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";
    pub const ORDER_DELETED: &str = "order.deleted";
    pub const INVOICE_CREATED: &str = "invoice.created";
    pub const INVOICE_PAYMENT_RECORDED: &str = "invoice.payment_recorded";
    pub const INVOICE_STATUS_CHANGED: &str = "invoice.status_changed";
    pub const MEASUREMENT_CREATED: &str = "measurement.created";
    pub const MEASUREMENT_VERSION_ADDED: &str = "measurement.version_added";
    pub const MEASUREMENT_APPROVED: &str = "measurement.approved";
    pub const MEASUREMENT_REJECTED: &str = "measurement.rejected";
    pub const MEASUREMENT_DELETED: &str = "measurement.deleted";
    pub const FABRIC_CREATED: &str = "fabric.created";
    pub const FABRIC_UPDATED: &str = "fabric.updated";
    pub const FABRIC_DELETED: &str = "fabric.deleted";
    pub const BRANCH_CREATED: &str = "branch.created";
    pub const BRANCH_UPDATED: &str = "branch.updated";
    pub const BRANCH_DELETED: &str = "branch.deleted";
}

/// Resource type names stored in `audit_logs.resource_type`.
pub mod resources {
    pub const USER: &str = "user";
    pub const APPOINTMENT: &str = "appointment";
    pub const ORDER: &str = "order";
    pub const INVOICE: &str = "invoice";
    pub const MEASUREMENT_PROFILE: &str = "measurement_profile";
    pub const FABRIC: &str = "fabric";
    pub const BRANCH: &str = "branch";
}

// ---------------------------------------------------------------------------
// Action-to-category mapping
// ---------------------------------------------------------------------------

pub const CATEGORY_AUTHENTICATION: &str = "authentication";
pub const CATEGORY_ACCOUNTS: &str = "accounts";
pub const CATEGORY_OPERATIONS: &str = "operations";

/// Map an action to a coarse category used by the audit stats view.
///
/// Unknown actions default to `"operations"`.
pub fn action_to_category(action: &str) -> &'static str {
    match action {
        actions::USER_LOGIN
        | actions::USER_LOGIN_FAILED
        | actions::USER_LOGOUT
        | actions::USER_PASSWORD_CHANGED => CATEGORY_AUTHENTICATION,
        a if a.starts_with("user.") || a.starts_with("tailor.") => CATEGORY_ACCOUNTS,
        _ => CATEGORY_OPERATIONS,
    }
}

// ---------------------------------------------------------------------------
// Client address
// ---------------------------------------------------------------------------

/// Pick the client IP for an audit entry.
///
/// The first entry of `X-Forwarded-For` wins; otherwise `X-Real-IP`.
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Option<String> {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| real_ip.map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields that should be redacted from audit log details before storage.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "credential",
    "payment_reference",
];

/// Redact sensitive fields from a JSON value, recursing into nested objects
/// and arrays.
///
/// Replaces the value of any key containing one of [`SENSITIVE_FIELDS`]
/// with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
