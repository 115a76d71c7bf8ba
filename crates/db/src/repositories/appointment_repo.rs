//! Repository for the `appointments` table.

use atelier_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use super::filter::{bind_all, bind_all_scalar, BindValue, Filter};
use crate::models::appointment::{
    Appointment, AppointmentFilter, CreateAppointment, UpdateAppointment,
};

const COLUMNS: &str = "id, customer_id, tailor_id, branch_id, appointment_type, status, \
                       scheduled_at, duration_minutes, is_priority, is_rush, rush_fee, \
                       customer_notes, tailor_notes, cancellation_reason, confirmation_sent, \
                       reminder_sent, original_appointment_id, reschedule_count, \
                       cancelled_at, completed_at, created_at, updated_at";

/// Statuses that occupy a tailor's calendar.
const BLOCKING: &str = "('pending', 'confirmed', 'in_progress')";

/// Provides CRUD and scheduling queries for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Insert an appointment unless the tailor is already booked for an
    /// overlapping interval.
    ///
    /// The tailor row is locked for the duration of the transaction so two
    /// concurrent bookings for the same tailor serialize. Returns `None` on a
    /// slot conflict.
    pub async fn create_if_free(
        pool: &PgPool,
        input: &CreateAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(tailor_id) = input.tailor_id {
            lock_tailor(&mut tx, tailor_id).await?;
            if has_overlap(
                &mut tx,
                tailor_id,
                input.scheduled_at,
                input.duration_minutes,
                None,
            )
            .await?
            {
                return Ok(None);
            }
        }

        let query = format!(
            "INSERT INTO appointments
                (customer_id, tailor_id, branch_id, appointment_type, scheduled_at,
                 duration_minutes, is_priority, is_rush, customer_notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(input.customer_id)
            .bind(input.tailor_id)
            .bind(input.branch_id)
            .bind(&input.appointment_type)
            .bind(input.scheduled_at)
            .bind(input.duration_minutes)
            .bind(input.is_priority)
            .bind(input.is_rush)
            .bind(&input.customer_notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(appointment))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered listing ordered by `scheduled_at DESC`.
    pub async fn list(
        pool: &PgPool,
        filter: &AppointmentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let f = build_appointment_filter(filter);
        let idx = f.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM appointments {} \
             ORDER BY scheduled_at DESC LIMIT ${idx} OFFSET ${}",
            f.where_clause(),
            idx + 1
        );
        bind_all(sqlx::query_as::<_, Appointment>(&query), &f.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &AppointmentFilter) -> Result<i64, sqlx::Error> {
        let f = build_appointment_filter(filter);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM appointments {}",
            f.where_clause()
        );
        bind_all_scalar(sqlx::query_scalar::<_, i64>(&query), &f.values)
            .fetch_one(pool)
            .await
    }

    /// Calendar-blocking appointments for a tailor in `[from, to)`.
    pub async fn list_booked_for_tailor(
        pool: &PgPool,
        tailor_id: DbId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE tailor_id = $1
               AND status IN {BLOCKING}
               AND scheduled_at < $3
               AND scheduled_at + make_interval(mins => duration_minutes) > $2
             ORDER BY scheduled_at"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(tailor_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Apply note and duration edits.
    ///
    /// A new duration goes through the same tailor lock and overlap check
    /// as creation, ignoring the appointment itself. Returns `Ok(None)` when
    /// the longer interval would collide with another booking.
    pub async fn update_if_free(
        pool: &PgPool,
        appointment: &Appointment,
        input: &UpdateAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let (Some(tailor_id), Some(minutes)) = (appointment.tailor_id, input.duration_minutes) {
            lock_tailor(&mut tx, tailor_id).await?;
            if has_overlap(
                &mut tx,
                tailor_id,
                appointment.scheduled_at,
                minutes,
                Some(appointment.id),
            )
            .await?
            {
                return Ok(None);
            }
        }

        let query = format!(
            "UPDATE appointments SET
                customer_notes = COALESCE($2, customer_notes),
                tailor_notes = COALESCE($3, tailor_notes),
                duration_minutes = COALESCE($4, duration_minutes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(appointment.id)
            .bind(&input.customer_notes)
            .bind(&input.tailor_notes)
            .bind(input.duration_minutes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Move an appointment to `new_time`, marking it `rescheduled`.
    ///
    /// Uses the same tailor lock and overlap check as creation, ignoring the
    /// appointment itself. Returns `Ok(None)` on a slot conflict.
    pub async fn reschedule_if_free(
        pool: &PgPool,
        appointment: &Appointment,
        new_time: Timestamp,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(tailor_id) = appointment.tailor_id {
            lock_tailor(&mut tx, tailor_id).await?;
            if has_overlap(
                &mut tx,
                tailor_id,
                new_time,
                appointment.duration_minutes,
                Some(appointment.id),
            )
            .await?
            {
                return Ok(None);
            }
        }

        let query = format!(
            "UPDATE appointments SET
                scheduled_at = $2,
                status = 'rescheduled',
                reschedule_count = reschedule_count + 1,
                reminder_sent = false
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Appointment>(&query)
            .bind(appointment.id)
            .bind(new_time)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        reason: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET
                status = 'cancelled',
                cancellation_reason = $2,
                cancelled_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Set the status. Completing stamps `completed_at`; cancelling stamps `cancelled_at`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        tailor_notes: Option<&str>,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET
                status = $2,
                tailor_notes = COALESCE($3, tailor_notes),
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END,
                cancelled_at = CASE WHEN $2 = 'cancelled' THEN NOW() ELSE cancelled_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .bind(status)
            .bind(tailor_notes)
            .fetch_optional(pool)
            .await
    }

    /// Confirmed appointments in `[from, to)` whose reminder has not gone out.
    pub async fn list_due_reminders(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE status = 'confirmed'
               AND reminder_sent = false
               AND scheduled_at >= $1 AND scheduled_at < $2
             ORDER BY scheduled_at"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    pub async fn mark_reminder_sent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET reminder_sent = true WHERE id = $1 AND reminder_sent = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_confirmation_sent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET confirmation_sent = true
             WHERE id = $1 AND confirmation_sent = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn lock_tailor(conn: &mut PgConnection, tailor_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(tailor_id)
        .fetch_optional(conn)
        .await?;
    Ok(())
}

async fn has_overlap(
    conn: &mut PgConnection,
    tailor_id: DbId,
    start: Timestamp,
    duration_minutes: i32,
    exclude_id: Option<DbId>,
) -> Result<bool, sqlx::Error> {
    let query = format!(
        "SELECT EXISTS (
            SELECT 1 FROM appointments
            WHERE tailor_id = $1
              AND status IN {BLOCKING}
              AND ($4::BIGINT IS NULL OR id <> $4)
              AND scheduled_at < $2 + make_interval(mins => $3)
              AND scheduled_at + make_interval(mins => duration_minutes) > $2
        )"
    );
    sqlx::query_scalar::<_, bool>(&query)
        .bind(tailor_id)
        .bind(start)
        .bind(duration_minutes)
        .bind(exclude_id)
        .fetch_one(conn)
        .await
}

fn build_appointment_filter(filter: &AppointmentFilter) -> Filter {
    let mut f = Filter::new();
    if let Some(id) = filter.customer_id {
        f.push("customer_id = {}", BindValue::BigInt(id));
    }
    if let Some(id) = filter.tailor_id {
        f.push("tailor_id = {}", BindValue::BigInt(id));
    }
    if let Some(id) = filter.branch_id {
        f.push("branch_id = {}", BindValue::BigInt(id));
    }
    if let Some(ref status) = filter.status {
        f.push("status = {}", BindValue::Text(status.clone()));
    }
    if let Some(ref kind) = filter.appointment_type {
        f.push("appointment_type = {}", BindValue::Text(kind.clone()));
    }
    if let Some(from) = filter.from {
        f.push("scheduled_at >= {}", BindValue::Timestamp(from));
    }
    if let Some(to) = filter.to {
        f.push("scheduled_at < {}", BindValue::Timestamp(to));
    }
    f
}
