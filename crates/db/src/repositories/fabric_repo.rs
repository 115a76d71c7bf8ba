//! Repository for the `fabrics` table.
//!
//! Filtering happens in memory via `atelier_core::fabric::FabricFilter`, so
//! the listing here simply returns the catalog in display order.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::fabric::{CreateFabric, Fabric, UpdateFabric};

const COLUMNS: &str = "id, name, fabric_type, color, pattern, price_per_meter, image_url, \
                       description, in_stock, created_at, updated_at";

pub struct FabricRepo;

impl FabricRepo {
    pub async fn create(pool: &PgPool, input: &CreateFabric) -> Result<Fabric, sqlx::Error> {
        let query = format!(
            "INSERT INTO fabrics
                (name, fabric_type, color, pattern, price_per_meter, image_url, description, in_stock)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fabric>(&query)
            .bind(input.name.trim())
            .bind(input.fabric_type.trim())
            .bind(&input.color)
            .bind(&input.pattern)
            .bind(input.price_per_meter)
            .bind(&input.image_url)
            .bind(&input.description)
            .bind(input.in_stock)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fabric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fabrics WHERE id = $1");
        sqlx::query_as::<_, Fabric>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The full catalog ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Fabric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fabrics ORDER BY name, id");
        sqlx::query_as::<_, Fabric>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFabric,
    ) -> Result<Option<Fabric>, sqlx::Error> {
        let query = format!(
            "UPDATE fabrics SET
                name = COALESCE($2, name),
                fabric_type = COALESCE($3, fabric_type),
                color = COALESCE($4, color),
                pattern = COALESCE($5, pattern),
                price_per_meter = COALESCE($6, price_per_meter),
                image_url = COALESCE($7, image_url),
                description = COALESCE($8, description),
                in_stock = COALESCE($9, in_stock)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fabric>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.fabric_type)
            .bind(&input.color)
            .bind(&input.pattern)
            .bind(input.price_per_meter)
            .bind(&input.image_url)
            .bind(&input.description)
            .bind(input.in_stock)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fabrics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
