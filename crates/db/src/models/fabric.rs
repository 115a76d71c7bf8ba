//! Fabric catalog model and DTOs.

use atelier_core::fabric::CatalogItem;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Fabric {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub fabric_type: String,
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub price_per_meter: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub in_stock: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CatalogItem for Fabric {
    fn name(&self) -> &str {
        &self.name
    }
    fn fabric_type(&self) -> &str {
        &self.fabric_type
    }
    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
    fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn price_per_meter(&self) -> f64 {
        self.price_per_meter
    }
    fn in_stock(&self) -> bool {
        self.in_stock
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFabric {
    pub name: String,
    #[serde(rename = "type")]
    pub fabric_type: String,
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub price_per_meter: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFabric {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub fabric_type: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub price_per_meter: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub in_stock: Option<bool>,
}
