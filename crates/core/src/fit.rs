//! Rule-based fit recommendations from a measurement set.
//!
//! Size prediction, anomaly checks, alteration suggestions, and an overall
//! confidence score. All rules are deterministic; there is no trained model.

use serde::Serialize;

use crate::measurement::{FitPreference, Measurements};

/// Confidence attached to a rule-based size prediction.
pub const RULE_SIZE_CONFIDENCE: f64 = 0.6;

/// Fields that count toward measurement completeness.
pub const CORE_FIELDS: &[&str] = &["chest", "waist", "hip", "shoulder", "arm_length"];

// ---------------------------------------------------------------------------
// Size prediction
// ---------------------------------------------------------------------------

/// Predict a letter size from chest circumference.
pub fn predict_size(m: &Measurements) -> (&'static str, f64) {
    let chest = m.chest.unwrap_or(0.0);
    let size = if chest < 90.0 {
        "S"
    } else if chest < 100.0 {
        "M"
    } else if chest < 110.0 {
        "L"
    } else if chest < 120.0 {
        "XL"
    } else {
        "XXL"
    };
    (size, RULE_SIZE_CONFIDENCE)
}

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub is_anomaly: bool,
    /// 0.3 per failed rule, capped at 1.0.
    pub score: f64,
    pub reasons: Vec<&'static str>,
    pub suspicious_fields: Vec<&'static str>,
}

/// Flag proportions and extremes that usually indicate a measuring mistake.
pub fn detect_anomalies(m: &Measurements) -> AnomalyReport {
    let chest = m.chest.unwrap_or(0.0);
    let waist = m.waist.unwrap_or(0.0);
    let hip = m.hip.unwrap_or(0.0);
    let shoulder = m.shoulder.unwrap_or(0.0);

    let mut reasons = Vec::new();
    if waist > chest + 10.0 {
        reasons.push("waist_larger_than_chest");
    }
    if waist > hip + 15.0 {
        reasons.push("waist_much_larger_than_hip");
    }
    if !(60.0..=150.0).contains(&chest) {
        reasons.push("extreme_chest");
    }
    if !(50.0..=150.0).contains(&waist) {
        reasons.push("extreme_waist");
    }

    let mut suspicious_fields = Vec::new();
    if waist > chest + 10.0 || !(50.0..=150.0).contains(&waist) {
        suspicious_fields.push("waist");
    }
    if !(60.0..=150.0).contains(&chest) {
        suspicious_fields.push("chest");
    }
    if !(30.0..=60.0).contains(&shoulder) {
        suspicious_fields.push("shoulder");
    }

    let score = (reasons.len() as f64 * 0.3).min(1.0);
    AnomalyReport {
        is_anomaly: !reasons.is_empty(),
        score: (score * 100.0).round() / 100.0,
        reasons,
        suspicious_fields,
    }
}

// ---------------------------------------------------------------------------
// Alteration suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlterationSuggestion {
    pub area: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
    pub priority: &'static str,
}

pub fn suggest_alterations(m: &Measurements, pref: FitPreference) -> Vec<AlterationSuggestion> {
    let mut out = Vec::new();

    if let (Some(chest), Some(waist)) = (m.chest, m.waist) {
        if chest > 0.0 && waist > 0.0 && chest / waist > 1.3 {
            out.push(AlterationSuggestion {
                area: "torso",
                kind: "tapering",
                description: "Consider tapering at waist for better fit",
                priority: "medium",
            });
        }
    }

    match pref {
        FitPreference::Slim => out.push(AlterationSuggestion {
            area: "overall",
            kind: "slimming",
            description: "Reduce measurements by 2-3cm for slim fit",
            priority: "high",
        }),
        FitPreference::Loose => out.push(AlterationSuggestion {
            area: "overall",
            kind: "loosening",
            description: "Add 3-5cm to measurements for comfortable loose fit",
            priority: "high",
        }),
        _ => {}
    }

    if let Some(shoulder) = m.shoulder {
        if shoulder > 0.0 && shoulder < 40.0 {
            out.push(AlterationSuggestion {
                area: "shoulder",
                kind: "padding",
                description: "Consider shoulder padding for better structure",
                priority: "low",
            });
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Weighted confidence in `[0, 1]`: completeness (0.3), plausibility (0.3),
/// and order history (0.4, five orders saturate it).
pub fn fit_confidence(m: &Measurements, previous_orders: usize) -> f64 {
    let complete = CORE_FIELDS
        .iter()
        .filter(|f| m.get(f).is_some_and(|v| v > 0.0))
        .count();
    let completeness = complete as f64 / CORE_FIELDS.len() as f64 * 0.3;

    let anomalies = detect_anomalies(m);
    let plausibility = if anomalies.is_anomaly {
        0.5
    } else {
        1.0 - anomalies.score
    } * 0.3;

    let history = if previous_orders > 0 {
        (previous_orders as f64 * 0.2).min(1.0) * 0.4
    } else {
        0.2
    };

    ((completeness + plausibility + history) * 100.0).round() / 100.0
}

/// Everything the fit endpoint returns for one version.
#[derive(Debug, Clone, Serialize)]
pub struct FitRecommendation {
    pub recommended_size: &'static str,
    pub size_confidence: f64,
    pub anomalies: AnomalyReport,
    pub alterations: Vec<AlterationSuggestion>,
    pub confidence: f64,
}

pub fn recommend(
    m: &Measurements,
    pref: FitPreference,
    previous_orders: usize,
) -> FitRecommendation {
    let (recommended_size, size_confidence) = predict_size(m);
    FitRecommendation {
        recommended_size,
        size_confidence,
        anomalies: detect_anomalies(m),
        alterations: suggest_alterations(m, pref),
        confidence: fit_confidence(m, previous_orders),
    }
}
