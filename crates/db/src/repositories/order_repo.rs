//! Repository for the `orders` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_all, BindValue, Filter};
use crate::models::order::{CreateOrder, Order, OrderFilter, UpdateOrder};

const COLUMNS: &str = "id, appointment_id, customer_id, tailor_id, order_number, garment_type, \
                       fabric_details, design_notes, status, estimated_price, final_price, \
                       estimated_delivery, actual_delivery, created_at, updated_at";

pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order. A duplicate `order_number` surfaces as a
    /// `uq_orders_order_number` violation so callers can retry.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders
                (appointment_id, customer_id, tailor_id, order_number, garment_type,
                 fabric_details, design_notes, estimated_price, estimated_delivery)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(input.appointment_id)
            .bind(input.customer_id)
            .bind(input.tailor_id)
            .bind(&input.order_number)
            .bind(&input.garment_type)
            .bind(&input.fabric_details)
            .bind(&input.design_notes)
            .bind(input.estimated_price)
            .bind(input.estimated_delivery)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered listing, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let mut f = Filter::new();
        if let Some(id) = filter.customer_id {
            f.push("customer_id = {}", BindValue::BigInt(id));
        }
        if let Some(id) = filter.tailor_id {
            f.push("tailor_id = {}", BindValue::BigInt(id));
        }
        if let Some(ref status) = filter.status {
            f.push("status = {}", BindValue::Text(status.clone()));
        }
        let idx = f.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM orders {} ORDER BY created_at DESC LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        bind_all(sqlx::query_as::<_, Order>(&query), &f.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive search on order number, garment type and fabric.
    ///
    /// `customer_id` / `tailor_id` restrict the search to the caller's orders.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        customer_id: Option<DbId>,
        tailor_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE (order_number ILIKE $1 OR garment_type ILIKE $1 OR fabric_details ILIKE $1)
               AND ($2::BIGINT IS NULL OR customer_id = $2)
               AND ($3::BIGINT IS NULL OR tailor_id = $3)
             ORDER BY created_at DESC
             LIMIT $4"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(format!("%{term}%"))
            .bind(customer_id)
            .bind(tailor_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of delivered or in-flight orders for a customer, used as fit history.
    pub async fn count_for_customer(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM orders WHERE customer_id = $1 AND status <> 'cancelled'",
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await
    }

    /// Apply an update. Moving to `delivered` stamps `actual_delivery` when not given.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                garment_type = COALESCE($2, garment_type),
                fabric_details = COALESCE($3, fabric_details),
                design_notes = COALESCE($4, design_notes),
                status = COALESCE($5, status),
                estimated_price = COALESCE($6, estimated_price),
                final_price = COALESCE($7, final_price),
                estimated_delivery = COALESCE($8, estimated_delivery),
                actual_delivery = COALESCE(
                    $9,
                    CASE WHEN $5 = 'delivered' THEN NOW() ELSE actual_delivery END
                )
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(&input.garment_type)
            .bind(&input.fabric_details)
            .bind(&input.design_notes)
            .bind(&input.status)
            .bind(input.estimated_price)
            .bind(input.final_price)
            .bind(input.estimated_delivery)
            .bind(input.actual_delivery)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
