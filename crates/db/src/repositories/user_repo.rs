//! Repository for the `users` table.

use atelier_core::roles::ACCOUNT_ACTIVE;
use atelier_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::filter::{bind_all, bind_all_scalar, BindValue, Filter};
use crate::models::user::{CreateUser, UpdateUser, User, UserFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, phone, password_hash, full_name, role, is_active, \
                       is_verified, is_priority, account_status, experience_years, \
                       specialization, bio, approved_by_id, approved_at, approval_notes, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, phone, password_hash, full_name, role, account_status,
                                experience_years, specialization, bio)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.role)
            .bind(&input.account_status)
            .bind(input.experience_years)
            .bind(&input.specialization)
            .bind(&input.bio)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE phone = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let f = build_user_filter(filter);
        let idx = f.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM users {} ORDER BY created_at DESC LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        bind_all(sqlx::query_as::<_, User>(&query), &f.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &UserFilter) -> Result<i64, sqlx::Error> {
        let f = build_user_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM users {}", f.where_clause());
        bind_all_scalar(sqlx::query_scalar::<_, i64>(&query), &f.values)
            .fetch_one(pool)
            .await
    }

    /// Case-insensitive name/email/phone search restricted to one role.
    pub async fn search(
        pool: &PgPool,
        role: &str,
        term: &str,
        limit: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE role = $1
               AND (full_name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
             ORDER BY full_name
             LIMIT $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .bind(format!("%{term}%"))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                is_verified = COALESCE($6, is_verified),
                is_priority = COALESCE($7, is_priority),
                experience_years = COALESCE($8, experience_years),
                specialization = COALESCE($9, specialization),
                bio = COALESCE($10, bio)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.role)
            .bind(input.is_active)
            .bind(input.is_verified)
            .bind(input.is_priority)
            .bind(input.experience_years)
            .bind(&input.specialization)
            .bind(&input.bio)
            .fetch_optional(pool)
            .await
    }

    /// Flip `is_active`, returning the updated row.
    pub async fn toggle_active(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_active = NOT is_active WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the failed login counter by 1, returning the new count.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the account status of a tailor application and record the reviewer.
    ///
    /// Only applies to tailors still in `pending`. Approval also activates the account.
    pub async fn review_application(
        pool: &PgPool,
        id: DbId,
        account_status: &str,
        reviewer_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                account_status = $2,
                is_active = ($2 = '{ACCOUNT_ACTIVE}'),
                approved_by_id = $3,
                approved_at = NOW(),
                approval_notes = $4
             WHERE id = $1 AND role = 'tailor' AND account_status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(account_status)
            .bind(reviewer_id)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }
}

fn build_user_filter(filter: &UserFilter) -> Filter {
    let mut f = Filter::new();
    if let Some(ref role) = filter.role {
        f.push("role = {}", BindValue::Text(role.clone()));
    }
    if let Some(is_active) = filter.is_active {
        f.push("is_active = {}", BindValue::Bool(is_active));
    }
    if let Some(ref status) = filter.account_status {
        f.push("account_status = {}", BindValue::Text(status.clone()));
    }
    if let Some(ref search) = filter.search {
        f.push(
            "(full_name ILIKE {} OR email ILIKE {})",
            BindValue::Text(format!("%{search}%")),
        );
    }
    f
}
