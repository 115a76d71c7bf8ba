//! Invoice entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: DbId,
    pub order_id: DbId,
    pub customer_id: DbId,
    pub invoice_number: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: String,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_date: Option<Timestamp>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub order_id: DbId,
    pub customer_id: DbId,
    pub invoice_number: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

/// A payment applied to an invoice. Amounts are already validated.
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub paid_amount: f64,
    pub status: String,
    pub payment_method: String,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub customer_id: Option<DbId>,
    pub status: Option<String>,
}
