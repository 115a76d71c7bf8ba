//! Notification channel and delivery status constants.
//!
//! These must match the values stored in `notifications.channel` and
//! `notifications.status` and referenced by the dispatcher, reminder
//! scheduler, and API handlers.

/// Stored for the notification bell; never leaves the server.
pub const CHANNEL_IN_APP: &str = "in_app";

/// Delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Recorded only; no SMS gateway is wired up.
pub const CHANNEL_SMS: &str = "sms";

/// Recorded only; no WhatsApp gateway is wired up.
pub const CHANNEL_WHATSAPP: &str = "whatsapp";

pub const ALL_CHANNELS: &[&str] = &[CHANNEL_EMAIL, CHANNEL_SMS, CHANNEL_WHATSAPP, CHANNEL_IN_APP];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
/// For in-app notifications this doubles as "read".
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_BOUNCED: &str = "bounced";

/// Default delivery attempts before a failed notification is abandoned.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

pub fn is_valid_channel(channel: &str) -> bool {
    ALL_CHANNELS.contains(&channel)
}

/// A failed notification may be retried while attempts remain.
pub fn can_retry(status: &str, retry_count: i32, max_retries: i32) -> bool {
    status == STATUS_FAILED && retry_count < max_retries
}

/// An in-app notification counts as unread until it is marked delivered.
pub fn is_unread(channel: &str, status: &str) -> bool {
    channel == CHANNEL_IN_APP && status != STATUS_DELIVERED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_only_failed_with_attempts_left() {
        assert!(can_retry(STATUS_FAILED, 0, DEFAULT_MAX_RETRIES));
        assert!(can_retry(STATUS_FAILED, 2, DEFAULT_MAX_RETRIES));
        assert!(!can_retry(STATUS_FAILED, 3, DEFAULT_MAX_RETRIES));
        assert!(!can_retry(STATUS_SENT, 0, DEFAULT_MAX_RETRIES));
    }

    #[test]
    fn unread_is_in_app_and_not_delivered() {
        assert!(is_unread(CHANNEL_IN_APP, STATUS_SENT));
        assert!(!is_unread(CHANNEL_IN_APP, STATUS_DELIVERED));
        assert!(!is_unread(CHANNEL_EMAIL, STATUS_SENT));
    }

    #[test]
    fn channel_validation() {
        assert!(is_valid_channel("whatsapp"));
        assert!(!is_valid_channel("pager"));
    }
}
