//! Repository for the `tailor_availability` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::availability::{CreateAvailability, TailorAvailability};

const COLUMNS: &str = "id, tailor_id, branch_id, day_of_week, start_time, end_time, \
                       slot_duration_minutes, buffer_time_minutes, max_appointments_per_day, \
                       is_active, created_at, updated_at";

pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Insert a window, replacing any existing one for the same tailor, branch and day.
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateAvailability,
    ) -> Result<TailorAvailability, sqlx::Error> {
        let query = format!(
            "INSERT INTO tailor_availability
                (tailor_id, branch_id, day_of_week, start_time, end_time,
                 slot_duration_minutes, buffer_time_minutes, max_appointments_per_day)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT ON CONSTRAINT uq_tailor_availability_day DO UPDATE SET
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                slot_duration_minutes = EXCLUDED.slot_duration_minutes,
                buffer_time_minutes = EXCLUDED.buffer_time_minutes,
                max_appointments_per_day = EXCLUDED.max_appointments_per_day,
                is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TailorAvailability>(&query)
            .bind(input.tailor_id)
            .bind(input.branch_id)
            .bind(&input.day_of_week)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.slot_duration_minutes)
            .bind(input.buffer_time_minutes)
            .bind(input.max_appointments_per_day)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TailorAvailability>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tailor_availability WHERE id = $1");
        sqlx::query_as::<_, TailorAvailability>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active windows at a branch, optionally for a single tailor.
    pub async fn list_for_branch(
        pool: &PgPool,
        branch_id: DbId,
        tailor_id: Option<DbId>,
    ) -> Result<Vec<TailorAvailability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tailor_availability
             WHERE branch_id = $1 AND is_active = true
               AND ($2::BIGINT IS NULL OR tailor_id = $2)
             ORDER BY tailor_id, day_of_week, start_time"
        );
        sqlx::query_as::<_, TailorAvailability>(&query)
            .bind(branch_id)
            .bind(tailor_id)
            .fetch_all(pool)
            .await
    }

    /// The active window for one tailor, branch and weekday, if any.
    pub async fn find_for_day(
        pool: &PgPool,
        tailor_id: DbId,
        branch_id: DbId,
        day_of_week: &str,
    ) -> Result<Option<TailorAvailability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tailor_availability
             WHERE tailor_id = $1 AND branch_id = $2 AND day_of_week = $3 AND is_active = true"
        );
        sqlx::query_as::<_, TailorAvailability>(&query)
            .bind(tailor_id)
            .bind(branch_id)
            .bind(day_of_week)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tailor_availability WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
