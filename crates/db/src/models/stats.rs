//! Read-only aggregate rows for the admin, analytics and tailor dashboards.

use atelier_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A grouped count, e.g. users per role or orders per status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub pending_revenue: f64,
    pub paid_invoices: i64,
    pub average_invoice: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FabricPopularity {
    pub fabric: String,
    pub order_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TailorPerformance {
    pub tailor_id: DbId,
    pub tailor_name: String,
    pub total_appointments: i64,
    pub completed_appointments: i64,
    /// Percentage in `[0, 100]`, rounded to one decimal.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct TailorDashboardStats {
    pub total_assigned: i64,
    pub pending: i64,
    pub completed_today: i64,
    pub this_week: i64,
    pub today: i64,
}
