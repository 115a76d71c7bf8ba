//! Admin analytics: revenue, fabric popularity, tailor performance, order trends.

use atelier_db::models::stats::{FabricPopularity, KeyCount, RevenueSummary, TailorPerformance};
use atelier_db::repositories::StatsRepo;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_PERIOD_DAYS: i64 = 30;
const MAX_PERIOD_DAYS: i64 = 3650;
const POPULAR_FABRIC_LIMIT: i64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub days: Option<i64>,
}

impl PeriodParams {
    fn days(&self) -> AppResult<i64> {
        match self.days {
            None => Ok(DEFAULT_PERIOD_DAYS),
            Some(d) if (1..=MAX_PERIOD_DAYS).contains(&d) => Ok(d),
            Some(d) => Err(AppError::BadRequest(format!(
                "days must be between 1 and {MAX_PERIOD_DAYS}, got {d}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevenueReport {
    pub period_days: i64,
    #[serde(flatten)]
    pub summary: RevenueSummary,
}

#[derive(Debug, Serialize)]
pub struct OrderTrends {
    pub period_days: i64,
    pub total_orders: i64,
    pub by_status: Vec<KeyCount>,
}

/// GET /api/v1/analytics/revenue
pub async fn revenue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PeriodParams>,
) -> AppResult<Json<DataResponse<RevenueReport>>> {
    let period_days = params.days()?;
    let since = Utc::now() - Duration::days(period_days);
    let summary = StatsRepo::revenue_since(&state.pool, since).await?;
    Ok(Json(DataResponse {
        data: RevenueReport {
            period_days,
            summary,
        },
    }))
}

/// GET /api/v1/analytics/popular-fabrics
pub async fn popular_fabrics(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<FabricPopularity>>>> {
    let fabrics = StatsRepo::popular_fabrics(&state.pool, POPULAR_FABRIC_LIMIT).await?;
    Ok(Json(DataResponse { data: fabrics }))
}

/// GET /api/v1/analytics/tailor-performance
pub async fn tailor_performance(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TailorPerformance>>>> {
    let rows = StatsRepo::tailor_performance(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/analytics/order-trends
pub async fn order_trends(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PeriodParams>,
) -> AppResult<Json<DataResponse<OrderTrends>>> {
    let period_days = params.days()?;
    let since = Utc::now() - Duration::days(period_days);
    let by_status = StatsRepo::orders_by_status_since(&state.pool, since).await?;
    Ok(Json(DataResponse {
        data: OrderTrends {
            period_days,
            total_orders: by_status.iter().map(|c| c.count).sum(),
            by_status,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn period_defaults_to_thirty_days() {
        assert_eq!(PeriodParams::default().days().unwrap(), 30);
        assert_eq!(PeriodParams { days: Some(7) }.days().unwrap(), 7);
    }

    #[test]
    fn period_rejects_non_positive_days() {
        assert_matches!(
            PeriodParams { days: Some(0) }.days(),
            Err(AppError::BadRequest(_))
        );
    }
}
