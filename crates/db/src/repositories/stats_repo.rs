//! Aggregate queries backing the admin, analytics and tailor dashboards.

use atelier_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::stats::{
    FabricPopularity, KeyCount, RevenueSummary, TailorDashboardStats, TailorPerformance,
};

pub struct StatsRepo;

impl StatsRepo {
    pub async fn users_by_role(pool: &PgPool) -> Result<Vec<KeyCount>, sqlx::Error> {
        sqlx::query_as::<_, KeyCount>(
            "SELECT role AS key, COUNT(*)::BIGINT AS count FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(pool)
        .await
    }

    /// Users who logged in at or after `since`.
    pub async fn active_users_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM users WHERE last_login_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    pub async fn appointments_by_status(pool: &PgPool) -> Result<Vec<KeyCount>, sqlx::Error> {
        sqlx::query_as::<_, KeyCount>(
            "SELECT status AS key, COUNT(*)::BIGINT AS count
             FROM appointments GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    /// Orders created at or after `since`, grouped by status.
    pub async fn orders_by_status_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<KeyCount>, sqlx::Error> {
        sqlx::query_as::<_, KeyCount>(
            "SELECT status AS key, COUNT(*)::BIGINT AS count
             FROM orders WHERE created_at >= $1
             GROUP BY status ORDER BY status",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Revenue for invoices issued at or after `since`.
    ///
    /// Paid revenue sums `paid_amount`; pending revenue is the unpaid remainder
    /// of invoices that are neither paid nor cancelled.
    pub async fn revenue_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<RevenueSummary, sqlx::Error> {
        sqlx::query_as::<_, RevenueSummary>(
            "SELECT
                COALESCE(SUM(paid_amount), 0)::DOUBLE PRECISION AS total_revenue,
                COALESCE(SUM(total_amount - paid_amount)
                    FILTER (WHERE status IN ('pending', 'partially_paid', 'overdue')), 0)
                    ::DOUBLE PRECISION AS pending_revenue,
                COUNT(*) FILTER (WHERE status = 'paid')::BIGINT AS paid_invoices,
                COALESCE(AVG(total_amount) FILTER (WHERE status = 'paid'), 0)
                    ::DOUBLE PRECISION AS average_invoice
             FROM invoices
             WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Most ordered fabrics by the free-text `fabric_details` column.
    pub async fn popular_fabrics(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<FabricPopularity>, sqlx::Error> {
        sqlx::query_as::<_, FabricPopularity>(
            "SELECT fabric_details AS fabric, COUNT(*)::BIGINT AS order_count
             FROM orders
             WHERE fabric_details IS NOT NULL AND fabric_details <> ''
             GROUP BY fabric_details
             ORDER BY order_count DESC, fabric
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Per-tailor completion rate, best first.
    pub async fn tailor_performance(pool: &PgPool) -> Result<Vec<TailorPerformance>, sqlx::Error> {
        sqlx::query_as::<_, TailorPerformance>(
            "SELECT
                u.id AS tailor_id,
                u.full_name AS tailor_name,
                COUNT(a.id)::BIGINT AS total_appointments,
                COUNT(a.id) FILTER (WHERE a.status = 'completed')::BIGINT AS completed_appointments,
                CASE WHEN COUNT(a.id) = 0 THEN 0::DOUBLE PRECISION
                     ELSE ROUND((COUNT(a.id) FILTER (WHERE a.status = 'completed'))::NUMERIC
                                * 100 / COUNT(a.id), 1)::DOUBLE PRECISION
                END AS completion_rate
             FROM users u
             LEFT JOIN appointments a ON a.tailor_id = u.id
             WHERE u.role = 'tailor'
             GROUP BY u.id, u.full_name
             ORDER BY completion_rate DESC, total_appointments DESC, u.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Dashboard counters for one tailor. Day and week bounds are supplied by the caller.
    pub async fn tailor_dashboard(
        pool: &PgPool,
        tailor_id: DbId,
        day_start: Timestamp,
        day_end: Timestamp,
        week_start: Timestamp,
    ) -> Result<TailorDashboardStats, sqlx::Error> {
        sqlx::query_as::<_, TailorDashboardStats>(
            "SELECT
                COUNT(*)::BIGINT AS total_assigned,
                COUNT(*) FILTER (WHERE status IN ('pending', 'confirmed'))::BIGINT AS pending,
                COUNT(*) FILTER (WHERE status = 'completed'
                                   AND completed_at >= $2 AND completed_at < $3)::BIGINT
                    AS completed_today,
                COUNT(*) FILTER (WHERE scheduled_at >= $4 AND scheduled_at < $4 + INTERVAL '7 days')
                    ::BIGINT AS this_week,
                COUNT(*) FILTER (WHERE scheduled_at >= $2 AND scheduled_at < $3)::BIGINT AS today
             FROM appointments
             WHERE tailor_id = $1",
        )
        .bind(tailor_id)
        .bind(day_start)
        .bind(day_end)
        .bind(week_start)
        .fetch_one(pool)
        .await
    }
}
