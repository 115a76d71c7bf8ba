//! Measurement profile and version models.

use atelier_core::measurement::{FitPreference, Measurements};
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeasurementProfile {
    pub id: DbId,
    pub customer_id: DbId,
    pub profile_name: String,
    pub is_default: bool,
    pub current_version: i32,
    pub status: String,
    pub approved_by_id: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An immutable snapshot of a profile's measurements.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeasurementVersion {
    pub id: DbId,
    pub profile_id: DbId,
    pub version_number: i32,
    pub neck: Option<f64>,
    pub shoulder: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub arm_length: Option<f64>,
    pub sleeve_length: Option<f64>,
    pub bicep: Option<f64>,
    pub wrist: Option<f64>,
    pub inseam: Option<f64>,
    pub outseam: Option<f64>,
    pub thigh: Option<f64>,
    pub knee: Option<f64>,
    pub calf: Option<f64>,
    pub ankle: Option<f64>,
    pub back_length: Option<f64>,
    pub front_length: Option<f64>,
    pub additional_measurements: Option<serde_json::Value>,
    pub fit_preference: String,
    pub posture_notes: Option<String>,
    pub special_requirements: Option<String>,
    pub measured_by_id: Option<DbId>,
    pub measurement_method: String,
    pub change_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MeasurementVersion {
    pub fn measurements(&self) -> Measurements {
        Measurements {
            neck: self.neck,
            shoulder: self.shoulder,
            chest: self.chest,
            waist: self.waist,
            hip: self.hip,
            arm_length: self.arm_length,
            sleeve_length: self.sleeve_length,
            bicep: self.bicep,
            wrist: self.wrist,
            inseam: self.inseam,
            outseam: self.outseam,
            thigh: self.thigh,
            knee: self.knee,
            calf: self.calf,
            ankle: self.ankle,
            back_length: self.back_length,
            front_length: self.front_length,
        }
    }

    /// Unknown stored values fall back to the default preference.
    pub fn fit_preference(&self) -> FitPreference {
        FitPreference::parse(&self.fit_preference).unwrap_or_default()
    }
}

/// Profile together with its current version, as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileWithVersion {
    #[serde(flatten)]
    pub profile: MeasurementProfile,
    pub current: Option<MeasurementVersion>,
}

#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub customer_id: DbId,
    pub profile_name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct CreateVersion {
    pub measurements: Measurements,
    pub additional_measurements: Option<serde_json::Value>,
    pub fit_preference: FitPreference,
    pub posture_notes: Option<String>,
    pub special_requirements: Option<String>,
    pub measured_by_id: Option<DbId>,
    pub measurement_method: String,
    pub change_notes: Option<String>,
}

/// Outcome of a tailor or admin review.
#[derive(Debug, Clone)]
pub struct ProfileReview {
    pub approved: bool,
    pub reviewer_id: DbId,
    pub notes: Option<String>,
}
