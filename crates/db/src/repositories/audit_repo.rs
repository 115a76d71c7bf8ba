//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use super::filter::{bind_all, bind_all_scalar, BindValue, Filter};
use crate::models::audit::{AuditFilter, AuditLog, AuditStats, CreateAuditLog};

/// Column list for enriched SELECTs (joined with `users` as `u`).
const COLUMNS: &str = "\
    a.id, a.user_id, a.action, a.resource_type, a.resource_id, a.details, \
    a.ip_address, a.user_agent, a.created_at, \
    u.email AS user_email, u.full_name AS user_name";

/// Provides append and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append an entry. Returns the new row id.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO audit_logs
                (user_id, action, resource_type, resource_id, details, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(pool)
        .await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &AuditFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let f = build_audit_filter(params);
        let idx = f.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs a LEFT JOIN users u ON u.id = a.user_id {} \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        bind_all(sqlx::query_as::<_, AuditLog>(&query), &f.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count audit logs matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditFilter) -> Result<i64, sqlx::Error> {
        let f = build_audit_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM audit_logs a {}",
            f.where_clause()
        );
        bind_all_scalar(sqlx::query_scalar::<_, i64>(&query), &f.values)
            .fetch_one(pool)
            .await
    }

    pub async fn stats(pool: &PgPool) -> Result<AuditStats, sqlx::Error> {
        sqlx::query_as::<_, AuditStats>(
            "SELECT
                COUNT(*)::BIGINT AS total_logs,
                COUNT(DISTINCT action)::BIGINT AS unique_actions,
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '24 hours')::BIGINT
                    AS recent_activity_24h
             FROM audit_logs",
        )
        .fetch_one(pool)
        .await
    }
}

fn build_audit_filter(params: &AuditFilter) -> Filter {
    let mut f = Filter::new();
    if let Some(ref action) = params.action {
        f.push("a.action = {}", BindValue::Text(action.clone()));
    }
    if let Some(user_id) = params.user_id {
        f.push("a.user_id = {}", BindValue::BigInt(user_id));
    }
    if let Some(ref resource_type) = params.resource_type {
        f.push("a.resource_type = {}", BindValue::Text(resource_type.clone()));
    }
    f
}
