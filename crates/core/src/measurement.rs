//! Body measurement fields, range validation, version comparison, and
//! profile review statuses.
//!
//! All measurements are centimetres. A profile's history is a list of
//! immutable versions; comparing two versions yields per-field diffs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Measurement set
// ---------------------------------------------------------------------------

/// The body measurements captured in one profile version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
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
}

/// Upper bound (cm, inclusive) per field, in column order.
pub const FIELD_LIMITS: &[(&str, f64)] = &[
    ("neck", 100.0),
    ("shoulder", 100.0),
    ("chest", 200.0),
    ("waist", 200.0),
    ("hip", 200.0),
    ("arm_length", 150.0),
    ("sleeve_length", 150.0),
    ("bicep", 100.0),
    ("wrist", 50.0),
    ("inseam", 150.0),
    ("outseam", 200.0),
    ("thigh", 150.0),
    ("knee", 100.0),
    ("calf", 100.0),
    ("ankle", 50.0),
    ("back_length", 150.0),
    ("front_length", 150.0),
];

impl Measurements {
    /// `(field name, value)` pairs in the same order as [`FIELD_LIMITS`].
    pub fn fields(&self) -> [(&'static str, Option<f64>); 17] {
        [
            ("neck", self.neck),
            ("shoulder", self.shoulder),
            ("chest", self.chest),
            ("waist", self.waist),
            ("hip", self.hip),
            ("arm_length", self.arm_length),
            ("sleeve_length", self.sleeve_length),
            ("bicep", self.bicep),
            ("wrist", self.wrist),
            ("inseam", self.inseam),
            ("outseam", self.outseam),
            ("thigh", self.thigh),
            ("knee", self.knee),
            ("calf", self.calf),
            ("ankle", self.ankle),
            ("back_length", self.back_length),
            ("front_length", self.front_length),
        ]
    }

    /// Look up a single field by name.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, v)| v)
    }

    /// Number of fields with a value.
    pub fn recorded_count(&self) -> usize {
        self.fields().iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Every present value must be within `(0, limit]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut errors = Vec::new();
        for ((name, value), (_, limit)) in self.fields().iter().zip(FIELD_LIMITS) {
            if let Some(v) = value {
                if !v.is_finite() || *v <= 0.0 || *v > *limit {
                    errors.push(format!("{name} must be between 0 and {limit} cm"));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// A single changed field between two versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementDiff {
    pub field: &'static str,
    pub old: Option<f64>,
    pub new: Option<f64>,
    /// `new - old` when both are present.
    pub diff: Option<f64>,
}

/// List every field whose value differs between `old` and `new`.
pub fn compare(old: &Measurements, new: &Measurements) -> Vec<MeasurementDiff> {
    old.fields()
        .into_iter()
        .zip(new.fields())
        .filter(|((_, a), (_, b))| a != b)
        .map(|((field, a), (_, b))| MeasurementDiff {
            field,
            old: a,
            new: b,
            diff: match (a, b) {
                (Some(a), Some(b)) => Some(((b - a) * 100.0).round() / 100.0),
                _ => None,
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fit preference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitPreference {
    Tight,
    Slim,
    #[default]
    Regular,
    Comfortable,
    Loose,
}

impl FitPreference {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "tight" => Ok(Self::Tight),
            "slim" => Ok(Self::Slim),
            "regular" => Ok(Self::Regular),
            "comfortable" => Ok(Self::Comfortable),
            "loose" => Ok(Self::Loose),
            _ => Err(CoreError::Validation(format!(
                "Invalid fit preference '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Slim => "slim",
            Self::Regular => "regular",
            Self::Comfortable => "comfortable",
            Self::Loose => "loose",
        }
    }
}

// ---------------------------------------------------------------------------
// Profile status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

impl ProfileStatus {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_review" => Ok(Self::PendingReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid profile status '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Validate a profile name (1 to 255 characters after trimming).
pub fn validate_profile_name(name: &str) -> Result<(), CoreError> {
    let len = name.trim().chars().count();
    if len == 0 || len > 255 {
        return Err(CoreError::Validation(
            "profile_name must be between 1 and 255 characters".into(),
        ));
    }
    Ok(())
}
