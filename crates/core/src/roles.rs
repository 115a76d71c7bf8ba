//! Well-known role and account-status name constants.
//!
//! These must match the `CHECK` constraints on `users.role` and
//! `users.account_status` in the initial migration.

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_TAILOR: &str = "tailor";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// Every valid role, in display order.
pub const ALL_ROLES: &[&str] = &[ROLE_CUSTOMER, ROLE_TAILOR, ROLE_ADMIN, ROLE_STAFF];

pub const ACCOUNT_ACTIVE: &str = "active";
pub const ACCOUNT_PENDING: &str = "pending";
pub const ACCOUNT_REJECTED: &str = "rejected";
pub const ACCOUNT_SUSPENDED: &str = "suspended";

/// Returns `true` if `role` is one of [`ALL_ROLES`].
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Roles allowed to see every record regardless of ownership.
pub fn sees_all_records(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}

/// Human-readable reason a non-active account may not log in.
///
/// Returns `None` for `active` (login allowed).
pub fn login_block_reason(account_status: &str) -> Option<&'static str> {
    match account_status {
        ACCOUNT_ACTIVE => None,
        ACCOUNT_PENDING => Some("Your account is pending approval. Please wait for admin review."),
        ACCOUNT_REJECTED => {
            Some("Your application has been rejected. Please contact support for details.")
        }
        ACCOUNT_SUSPENDED => Some("Your account has been suspended. Please contact support."),
        _ => Some("Account is not active"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_account_is_not_blocked() {
        assert!(login_block_reason(ACCOUNT_ACTIVE).is_none());
    }

    #[test]
    fn pending_and_rejected_accounts_are_blocked() {
        assert!(login_block_reason(ACCOUNT_PENDING)
            .unwrap()
            .contains("pending approval"));
        assert!(login_block_reason(ACCOUNT_REJECTED)
            .unwrap()
            .contains("rejected"));
        assert!(login_block_reason("mystery").is_some());
    }

    #[test]
    fn role_helpers() {
        assert!(is_valid_role(ROLE_STAFF));
        assert!(!is_valid_role("owner"));
        assert!(sees_all_records(ROLE_ADMIN));
        assert!(sees_all_records(ROLE_STAFF));
        assert!(!sees_all_records(ROLE_TAILOR));
    }
}
