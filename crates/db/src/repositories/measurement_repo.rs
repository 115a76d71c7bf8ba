//! Repository for `measurement_profiles` and `measurement_versions`.

use atelier_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::measurement::{
    CreateProfile, CreateVersion, MeasurementProfile, MeasurementVersion, ProfileReview,
};

const PROFILE_COLUMNS: &str = "id, customer_id, profile_name, is_default, current_version, \
                               status, approved_by_id, approved_at, rejection_reason, \
                               created_at, updated_at";

const VERSION_COLUMNS: &str = "id, profile_id, version_number, neck, shoulder, chest, waist, \
                               hip, arm_length, sleeve_length, bicep, wrist, inseam, outseam, \
                               thigh, knee, calf, ankle, back_length, front_length, \
                               additional_measurements, fit_preference, posture_notes, \
                               special_requirements, measured_by_id, measurement_method, \
                               change_notes, created_at, updated_at";

pub struct MeasurementRepo;

impl MeasurementRepo {
    // -- Profiles --

    /// Create a profile together with its first version (version 1, `draft`).
    pub async fn create_profile(
        pool: &PgPool,
        profile: &CreateProfile,
        version: &CreateVersion,
    ) -> Result<(MeasurementProfile, MeasurementVersion), sqlx::Error> {
        let mut tx = pool.begin().await?;

        if profile.is_default {
            clear_default(&mut tx, profile.customer_id, None).await?;
        }

        let query = format!(
            "INSERT INTO measurement_profiles (customer_id, profile_name, is_default)
             VALUES ($1, $2, $3)
             RETURNING {PROFILE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(profile.customer_id)
            .bind(&profile.profile_name)
            .bind(profile.is_default)
            .fetch_one(&mut *tx)
            .await?;

        let first = insert_version(&mut tx, created.id, 1, version).await?;

        tx.commit().await?;
        Ok((created, first))
    }

    pub async fn find_profile(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MeasurementProfile>, sqlx::Error> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM measurement_profiles WHERE id = $1");
        sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A customer's profiles, default first.
    pub async fn list_profiles(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<MeasurementProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM measurement_profiles
             WHERE customer_id = $1
             ORDER BY is_default DESC, created_at DESC"
        );
        sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// The customer's default profile, falling back to the most recent one.
    pub async fn find_default_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<MeasurementProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM measurement_profiles
             WHERE customer_id = $1
             ORDER BY is_default DESC, created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Rename a profile and/or make it the default.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        profile_name: Option<&str>,
        is_default: Option<bool>,
    ) -> Result<Option<MeasurementProfile>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if is_default == Some(true) {
            let customer_id = sqlx::query_scalar::<_, DbId>(
                "SELECT customer_id FROM measurement_profiles WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            match customer_id {
                Some(customer_id) => clear_default(&mut tx, customer_id, Some(id)).await?,
                None => return Ok(None),
            }
        }

        let query = format!(
            "UPDATE measurement_profiles SET
                profile_name = COALESCE($2, profile_name),
                is_default = COALESCE($3, is_default)
             WHERE id = $1
             RETURNING {PROFILE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(id)
            .bind(profile_name)
            .bind(is_default)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a profile and, by cascade, its versions.
    pub async fn delete_profile(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM measurement_profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record an approval or rejection.
    ///
    /// Approval stamps the reviewer and clears any earlier rejection reason;
    /// rejection stores the notes as the reason and clears the approver.
    pub async fn review(
        pool: &PgPool,
        id: DbId,
        review: &ProfileReview,
    ) -> Result<Option<MeasurementProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE measurement_profiles SET
                status = CASE WHEN $2 THEN 'approved' ELSE 'rejected' END,
                approved_by_id = CASE WHEN $2 THEN $3 ELSE NULL END,
                approved_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                rejection_reason = CASE WHEN $2 THEN NULL ELSE $4 END
             WHERE id = $1
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, MeasurementProfile>(&query)
            .bind(id)
            .bind(review.approved)
            .bind(review.reviewer_id)
            .bind(&review.notes)
            .fetch_optional(pool)
            .await
    }

    // -- Versions --

    /// Append a new version and move the profile back to `pending_review`.
    ///
    /// The profile row is locked so concurrent additions get distinct numbers.
    pub async fn add_version(
        pool: &PgPool,
        profile_id: DbId,
        version: &CreateVersion,
    ) -> Result<Option<MeasurementVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT current_version FROM measurement_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let next = current + 1;
        let inserted = insert_version(&mut tx, profile_id, next, version).await?;

        sqlx::query(
            "UPDATE measurement_profiles SET current_version = $2, status = 'pending_review'
             WHERE id = $1",
        )
        .bind(profile_id)
        .bind(next)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(inserted))
    }

    /// All versions of a profile, newest first.
    pub async fn list_versions(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<MeasurementVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM measurement_versions
             WHERE profile_id = $1
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, MeasurementVersion>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_version(
        pool: &PgPool,
        profile_id: DbId,
        version_number: i32,
    ) -> Result<Option<MeasurementVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM measurement_versions
             WHERE profile_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, MeasurementVersion>(&query)
            .bind(profile_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// The version a profile currently points at.
    pub async fn current_version(
        pool: &PgPool,
        profile: &MeasurementProfile,
    ) -> Result<Option<MeasurementVersion>, sqlx::Error> {
        Self::find_version(pool, profile.id, profile.current_version).await
    }
}

async fn clear_default(
    conn: &mut PgConnection,
    customer_id: DbId,
    except_id: Option<DbId>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE measurement_profiles SET is_default = false
         WHERE customer_id = $1 AND is_default = true
           AND ($2::BIGINT IS NULL OR id <> $2)",
    )
    .bind(customer_id)
    .bind(except_id)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_version(
    conn: &mut PgConnection,
    profile_id: DbId,
    version_number: i32,
    v: &CreateVersion,
) -> Result<MeasurementVersion, sqlx::Error> {
    let m = &v.measurements;
    let query = format!(
        "INSERT INTO measurement_versions
            (profile_id, version_number, neck, shoulder, chest, waist, hip, arm_length,
             sleeve_length, bicep, wrist, inseam, outseam, thigh, knee, calf, ankle,
             back_length, front_length, additional_measurements, fit_preference,
             posture_notes, special_requirements, measured_by_id, measurement_method,
             change_notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                 $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
         RETURNING {VERSION_COLUMNS}"
    );
    sqlx::query_as::<_, MeasurementVersion>(&query)
        .bind(profile_id)
        .bind(version_number)
        .bind(m.neck)
        .bind(m.shoulder)
        .bind(m.chest)
        .bind(m.waist)
        .bind(m.hip)
        .bind(m.arm_length)
        .bind(m.sleeve_length)
        .bind(m.bicep)
        .bind(m.wrist)
        .bind(m.inseam)
        .bind(m.outseam)
        .bind(m.thigh)
        .bind(m.knee)
        .bind(m.calf)
        .bind(m.ankle)
        .bind(m.back_length)
        .bind(m.front_length)
        .bind(&v.additional_measurements)
        .bind(v.fit_preference.as_str())
        .bind(&v.posture_notes)
        .bind(&v.special_requirements)
        .bind(v.measured_by_id)
        .bind(&v.measurement_method)
        .bind(&v.change_notes)
        .fetch_one(conn)
        .await
}
