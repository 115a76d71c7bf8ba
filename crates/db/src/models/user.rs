//! User entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_priority: bool,
    pub account_status: String,
    pub experience_years: Option<i32>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub approved_by_id: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub approval_notes: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash, no lockout state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub phone: Option<String>,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_priority: bool,
    pub account_status: String,
    pub experience_years: Option<i32>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub approval_notes: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            phone: u.phone.clone(),
            full_name: u.full_name.clone(),
            role: u.role.clone(),
            is_active: u.is_active,
            is_verified: u.is_verified,
            is_priority: u.is_priority,
            account_status: u.account_status.clone(),
            experience_years: u.experience_years,
            specialization: u.specialization.clone(),
            bio: u.bio.clone(),
            approved_at: u.approved_at,
            approval_notes: u.approval_notes.clone(),
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self::from(&u)
    }
}

/// DTO for creating a new user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub account_status: String,
    pub experience_years: Option<i32>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_priority: Option<bool>,
    pub experience_years: Option<i32>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
}

/// Filters for the paginated user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub account_status: Option<String>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
}
