//! Handlers for measurement profiles, their versions, review, and fit
//! recommendations.
//!
//! Customers work with their own profiles only. Tailors, admins and staff
//! can read every profile and review them.

use atelier_core::audit::{actions, resources};
use atelier_core::fit::{recommend, FitRecommendation};
use atelier_core::measurement::{
    compare, validate_profile_name, FitPreference, MeasurementDiff, Measurements,
};
use atelier_core::types::DbId;
use atelier_db::models::measurement::{
    CreateProfile, CreateVersion, MeasurementProfile, MeasurementVersion, ProfileReview,
    ProfileWithVersion,
};
use atelier_db::repositories::{MeasurementRepo, OrderRepo};
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireWorkshop;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const DEFAULT_METHOD: &str = "manual";
const MAX_METHOD_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One set of measurements plus the notes recorded with it.
#[derive(Debug, Deserialize)]
pub struct VersionInput {
    #[serde(flatten)]
    pub measurements: Measurements,
    pub additional_measurements: Option<serde_json::Value>,
    #[serde(default)]
    pub fit_preference: FitPreference,
    pub posture_notes: Option<String>,
    pub special_requirements: Option<String>,
    pub measurement_method: Option<String>,
    pub change_notes: Option<String>,
}

impl VersionInput {
    fn into_create(self, measured_by_id: DbId) -> AppResult<CreateVersion> {
        self.measurements.validate()?;
        let measurement_method = self
            .measurement_method
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_METHOD.to_string());
        if measurement_method.chars().count() > MAX_METHOD_LEN {
            return Err(AppError::BadRequest(format!(
                "measurement_method must be at most {MAX_METHOD_LEN} characters"
            )));
        }
        Ok(CreateVersion {
            measurements: self.measurements,
            additional_measurements: self.additional_measurements,
            fit_preference: self.fit_preference,
            posture_notes: self.posture_notes,
            special_requirements: self.special_requirements,
            measured_by_id: Some(measured_by_id),
            measurement_method,
            change_notes: self.change_notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub profile_name: String,
    #[serde(default)]
    pub is_default: bool,
    pub measurements: VersionInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub profile_name: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileListParams {
    pub customer_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Serialize)]
pub struct VersionComparison {
    pub profile_id: DbId,
    pub from_version: i32,
    pub to_version: i32,
    pub changes: Vec<MeasurementDiff>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approved: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FitRecommendationResponse {
    pub profile_id: DbId,
    pub version_number: i32,
    pub fit_preference: FitPreference,
    #[serde(flatten)]
    pub recommendation: FitRecommendation,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a profile the caller may access.
async fn load_profile(
    state: &AppState,
    auth_user: &AuthUser,
    id: DbId,
) -> AppResult<MeasurementProfile> {
    let profile = MeasurementRepo::find_profile(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement profile", id))?;
    if auth_user.is_customer() && profile.customer_id != auth_user.user_id {
        return Err(AppError::forbidden("Not authorized to view this profile"));
    }
    Ok(profile)
}

async fn load_version(state: &AppState, profile_id: DbId, n: i32) -> AppResult<MeasurementVersion> {
    MeasurementRepo::find_version(&state.pool, profile_id, n)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Version {n} does not exist")))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// POST /api/v1/measurements/profiles
///
/// Creates the profile for the caller together with version 1.
pub async fn create_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Json(input): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProfileWithVersion>>)> {
    validate_profile_name(&input.profile_name)?;
    let version = input.measurements.into_create(auth_user.user_id)?;
    let profile = CreateProfile {
        customer_id: auth_user.user_id,
        profile_name: input.profile_name.trim().to_string(),
        is_default: input.is_default,
    };

    let (profile, version) =
        MeasurementRepo::create_profile(&state.pool, &profile, &version).await?;

    tracing::info!(
        profile_id = profile.id,
        customer_id = profile.customer_id,
        "Measurement profile created"
    );
    AuditEntry::new(actions::MEASUREMENT_CREATED)
        .user(auth_user.user_id)
        .resource(resources::MEASUREMENT_PROFILE, profile.id)
        .details(serde_json::json!({ "profile_name": profile.profile_name }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProfileWithVersion {
                profile,
                current: Some(version),
            },
        }),
    ))
}

/// GET /api/v1/measurements/profiles
///
/// Customers get their own profiles. Other roles must name a `customer_id`,
/// defaulting to their own.
pub async fn list_profiles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ProfileListParams>,
) -> AppResult<Json<DataResponse<Vec<MeasurementProfile>>>> {
    let customer_id = if auth_user.is_customer() {
        auth_user.user_id
    } else {
        params.customer_id.unwrap_or(auth_user.user_id)
    };
    let profiles = MeasurementRepo::list_profiles(&state.pool, customer_id).await?;
    Ok(Json(DataResponse { data: profiles }))
}

/// GET /api/v1/measurements/profiles/{id}
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProfileWithVersion>>> {
    let profile = load_profile(&state, &auth_user, id).await?;
    let current = MeasurementRepo::current_version(&state.pool, &profile).await?;
    Ok(Json(DataResponse {
        data: ProfileWithVersion { profile, current },
    }))
}

/// PUT /api/v1/measurements/profiles/{id}
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<MeasurementProfile>>> {
    load_profile(&state, &auth_user, id).await?;
    if let Some(name) = input.profile_name.as_deref() {
        validate_profile_name(name)?;
    }

    let profile = MeasurementRepo::update_profile(
        &state.pool,
        id,
        input.profile_name.as_deref().map(str::trim),
        input.is_default,
    )
    .await?
    .ok_or_else(|| AppError::not_found("Measurement profile", id))?;
    Ok(Json(DataResponse { data: profile }))
}

/// DELETE /api/v1/measurements/profiles/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    load_profile(&state, &auth_user, id).await?;
    if !MeasurementRepo::delete_profile(&state.pool, id).await? {
        return Err(AppError::not_found("Measurement profile", id));
    }

    AuditEntry::new(actions::MEASUREMENT_DELETED)
        .user(auth_user.user_id)
        .resource(resources::MEASUREMENT_PROFILE, id)
        .client(&client)
        .record(&state.pool)
        .await;

    Ok(Json(MessageResponse::new(
        "Measurement profile deleted successfully",
    )))
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// GET /api/v1/measurements/profiles/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MeasurementVersion>>>> {
    load_profile(&state, &auth_user, id).await?;
    let versions = MeasurementRepo::list_versions(&state.pool, id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/measurements/profiles/{id}/versions
///
/// Appends a version and sends the profile back to review.
pub async fn add_version(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<VersionInput>,
) -> AppResult<(StatusCode, Json<DataResponse<MeasurementVersion>>)> {
    load_profile(&state, &auth_user, id).await?;
    let create = input.into_create(auth_user.user_id)?;

    let version = MeasurementRepo::add_version(&state.pool, id, &create)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement profile", id))?;

    AuditEntry::new(actions::MEASUREMENT_VERSION_ADDED)
        .user(auth_user.user_id)
        .resource(resources::MEASUREMENT_PROFILE, id)
        .details(serde_json::json!({ "version_number": version.version_number }))
        .client(&client)
        .record(&state.pool)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/measurements/profiles/{id}/compare?from=&to=
pub async fn compare_versions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<CompareParams>,
) -> AppResult<Json<DataResponse<VersionComparison>>> {
    load_profile(&state, &auth_user, id).await?;
    let old = load_version(&state, id, params.from).await?;
    let new = load_version(&state, id, params.to).await?;

    Ok(Json(DataResponse {
        data: VersionComparison {
            profile_id: id,
            from_version: old.version_number,
            to_version: new.version_number,
            changes: compare(&old.measurements(), &new.measurements()),
        },
    }))
}

// ---------------------------------------------------------------------------
// Review and fit
// ---------------------------------------------------------------------------

/// POST /api/v1/measurements/profiles/{id}/approve
pub async fn review_profile(
    State(state): State<AppState>,
    RequireWorkshop(reviewer): RequireWorkshop,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<Json<DataResponse<MeasurementProfile>>> {
    let notes = input.notes.filter(|n| !n.trim().is_empty());
    let review = ProfileReview {
        approved: input.approved,
        reviewer_id: reviewer.user_id,
        notes: notes.clone(),
    };
    let profile = MeasurementRepo::review(&state.pool, id, &review)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement profile", id))?;

    let action = if input.approved {
        actions::MEASUREMENT_APPROVED
    } else {
        actions::MEASUREMENT_REJECTED
    };
    tracing::info!(
        profile_id = id,
        reviewer_id = reviewer.user_id,
        approved = input.approved,
        "Measurement profile reviewed"
    );
    AuditEntry::new(action)
        .user(reviewer.user_id)
        .resource(resources::MEASUREMENT_PROFILE, id)
        .details(serde_json::json!({ "notes": notes }))
        .client(&client)
        .record(&state.pool)
        .await;
    state.publish(
        PlatformEvent::new(action)
            .with_source(resources::MEASUREMENT_PROFILE, id)
            .with_actor(reviewer.user_id)
            .with_payload(serde_json::json!({ "notes": notes })),
    );

    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/measurements/profiles/{id}/fit-recommendation
///
/// Rule-based size and alteration advice for the current version. The
/// customer's order history feeds the confidence score.
pub async fn fit_recommendation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FitRecommendationResponse>>> {
    let profile = load_profile(&state, &auth_user, id).await?;
    let version = MeasurementRepo::current_version(&state.pool, &profile)
        .await?
        .ok_or_else(|| AppError::BadRequest("No measurements found for this profile".into()))?;
    let previous_orders = OrderRepo::count_for_customer(&state.pool, profile.customer_id).await?;

    let fit_preference = version.fit_preference();
    let recommendation = recommend(
        &version.measurements(),
        fit_preference,
        usize::try_from(previous_orders).unwrap_or(0),
    );

    Ok(Json(DataResponse {
        data: FitRecommendationResponse {
            profile_id: profile.id,
            version_number: version.version_number,
            fit_preference,
            recommendation,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_input_defaults_method_and_validates_ranges() {
        let input: VersionInput =
            serde_json::from_value(serde_json::json!({ "chest": 98.5, "waist": 84.0 })).unwrap();
        let create = input.into_create(3).unwrap();
        assert_eq!(create.measurement_method, DEFAULT_METHOD);
        assert_eq!(create.fit_preference, FitPreference::Regular);
        assert_eq!(create.measurements.chest, Some(98.5));
        assert_eq!(create.measured_by_id, Some(3));

        let bad: VersionInput =
            serde_json::from_value(serde_json::json!({ "chest": 450.0 })).unwrap();
        assert!(bad.into_create(3).is_err());
    }
}
