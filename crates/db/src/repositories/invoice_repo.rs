//! Repository for the `invoices` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use super::filter::{bind_all, BindValue, Filter};
use crate::models::invoice::{CreateInvoice, Invoice, InvoiceFilter, RecordPayment};

const COLUMNS: &str = "id, order_id, customer_id, invoice_number, subtotal, tax_amount, \
                       discount_amount, total_amount, paid_amount, status, payment_method, \
                       payment_reference, payment_date, issue_date, due_date, notes, \
                       created_at, updated_at";

pub struct InvoiceRepo;

impl InvoiceRepo {
    pub async fn create(pool: &PgPool, input: &CreateInvoice) -> Result<Invoice, sqlx::Error> {
        let query = format!(
            "INSERT INTO invoices
                (order_id, customer_id, invoice_number, subtotal, tax_amount,
                 discount_amount, total_amount, issue_date, due_date, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(input.order_id)
            .bind(input.customer_id)
            .bind(&input.invoice_number)
            .bind(input.subtotal)
            .bind(input.tax_amount)
            .bind(input.discount_amount)
            .bind(input.total_amount)
            .bind(input.issue_date)
            .bind(input.due_date)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &InvoiceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, sqlx::Error> {
        let mut f = Filter::new();
        if let Some(id) = filter.customer_id {
            f.push("customer_id = {}", BindValue::BigInt(id));
        }
        if let Some(ref status) = filter.status {
            f.push("status = {}", BindValue::Text(status.clone()));
        }
        let idx = f.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM invoices {} ORDER BY created_at DESC LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        bind_all(sqlx::query_as::<_, Invoice>(&query), &f.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a payment to the invoice under a row lock.
    ///
    /// The invoice is read with `FOR UPDATE`, `apply` computes the new paid
    /// total and status from that locked row, and the update commits in the
    /// same transaction, so concurrent payments serialize. Returns `None`
    /// when the invoice does not exist. An error from `apply` rolls back.
    pub async fn record_payment<F, E>(
        pool: &PgPool,
        id: DbId,
        apply: F,
    ) -> Result<Option<Invoice>, E>
    where
        F: FnOnce(&Invoice) -> Result<RecordPayment, E>,
        E: From<sqlx::Error>,
    {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let payment = apply(&current)?;

        let query = format!(
            "UPDATE invoices SET
                paid_amount = $2,
                status = $3,
                payment_method = $4,
                payment_reference = COALESCE($5, payment_reference),
                payment_date = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(payment.paid_amount)
            .bind(&payment.status)
            .bind(&payment.payment_method)
            .bind(&payment.payment_reference)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        let query = format!("UPDATE invoices SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
