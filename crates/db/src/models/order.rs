//! Order entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: DbId,
    pub appointment_id: Option<DbId>,
    pub customer_id: DbId,
    pub tailor_id: Option<DbId>,
    pub order_number: String,
    pub garment_type: String,
    pub fabric_details: Option<String>,
    pub design_notes: Option<String>,
    pub status: String,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,
    pub estimated_delivery: Option<Timestamp>,
    pub actual_delivery: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub appointment_id: Option<DbId>,
    pub customer_id: DbId,
    pub tailor_id: Option<DbId>,
    pub order_number: String,
    pub garment_type: String,
    pub fabric_details: Option<String>,
    pub design_notes: Option<String>,
    pub estimated_price: Option<f64>,
    pub estimated_delivery: Option<Timestamp>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub garment_type: Option<String>,
    pub fabric_details: Option<String>,
    pub design_notes: Option<String>,
    pub status: Option<String>,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,
    pub estimated_delivery: Option<Timestamp>,
    pub actual_delivery: Option<Timestamp>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<DbId>,
    pub tailor_id: Option<DbId>,
    pub status: Option<String>,
}
