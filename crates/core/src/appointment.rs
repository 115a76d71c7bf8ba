//! Appointment types, statuses, and lifecycle rules.
//!
//! Statuses are stored as text in `appointments.status`; the transition
//! table below is the single source of truth for what the status endpoint
//! accepts.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum appointment duration in minutes.
pub const MIN_DURATION_MINUTES: i32 = 15;

/// Maximum appointment duration in minutes.
pub const MAX_DURATION_MINUTES: i32 = 240;

/// Default appointment duration in minutes.
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

/// Maximum length of customer notes.
pub const MAX_CUSTOMER_NOTES_LEN: usize = 1000;

/// Maximum length of a cancellation reason.
pub const MAX_CANCELLATION_REASON_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Appointment type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Measurement,
    Fitting,
    Delivery,
    Consultation,
    Alteration,
}

impl AppointmentType {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "measurement" => Ok(Self::Measurement),
            "fitting" => Ok(Self::Fitting),
            "delivery" => Ok(Self::Delivery),
            "consultation" => Ok(Self::Consultation),
            "alteration" => Ok(Self::Alteration),
            _ => Err(CoreError::Validation(format!(
                "Invalid appointment type '{s}'. Must be one of: measurement, fitting, delivery, consultation, alteration"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::Fitting => "fitting",
            Self::Delivery => "delivery",
            Self::Consultation => "consultation",
            Self::Alteration => "alteration",
        }
    }
}

// ---------------------------------------------------------------------------
// Appointment status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
}

impl AppointmentStatus {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "rescheduled" => Ok(Self::Rescheduled),
            "no_show" => Ok(Self::NoShow),
            _ => Err(CoreError::Validation(format!(
                "Invalid appointment status '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
            Self::NoShow => "no_show",
        }
    }

    /// Not yet cancelled, completed, or marked as a no-show.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_reschedule(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Statuses reachable from `self` via the status endpoint.
    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled, NoShow],
            Confirmed => &[InProgress, Completed, Cancelled, NoShow],
            InProgress => &[Completed, Cancelled],
            Rescheduled => &[Confirmed, Cancelled],
            Completed | Cancelled | NoShow => &[],
        }
    }

    pub fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Validate a status change, returning a descriptive error when illegal.
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot change appointment status from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Validate an appointment duration.
pub fn validate_duration(minutes: i32) -> Result<(), CoreError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(CoreError::Validation(format!(
            "Duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}

/// Validate a cancellation reason (1 to 500 characters after trimming).
pub fn validate_cancellation_reason(reason: &str) -> Result<(), CoreError> {
    let len = reason.trim().chars().count();
    if len == 0 || len > MAX_CANCELLATION_REASON_LEN {
        return Err(CoreError::Validation(format!(
            "Cancellation reason must be between 1 and {MAX_CANCELLATION_REASON_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_round_trips_known_values() {
        for s in ["pending", "confirmed", "in_progress", "no_show"] {
            assert_eq!(AppointmentStatus::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(
            AppointmentType::parse("fitting").unwrap(),
            AppointmentType::Fitting
        );
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_matches!(
            AppointmentStatus::parse("done"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            AppointmentType::parse("haircut"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn only_pending_and_confirmed_can_be_cancelled_or_rescheduled() {
        assert!(AppointmentStatus::Pending.can_cancel());
        assert!(AppointmentStatus::Confirmed.can_reschedule());
        assert!(!AppointmentStatus::InProgress.can_cancel());
        assert!(!AppointmentStatus::Rescheduled.can_reschedule());
        assert!(!AppointmentStatus::Completed.can_cancel());
    }

    #[test]
    fn active_excludes_terminal_states() {
        assert!(AppointmentStatus::Rescheduled.is_active());
        assert!(!AppointmentStatus::NoShow.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(AppointmentStatus::Completed.valid_transitions().is_empty());
        assert!(AppointmentStatus::Cancelled.valid_transitions().is_empty());
        assert_matches!(
            validate_transition(AppointmentStatus::Completed, AppointmentStatus::Pending),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn confirmed_can_start_or_complete() {
        assert!(validate_transition(
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress
        )
        .is_ok());
        assert!(validate_transition(
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed
        )
        .is_ok());
        assert!(validate_transition(AppointmentStatus::Pending, AppointmentStatus::Completed)
            .is_err());
    }

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(15).is_ok());
        assert!(validate_duration(240).is_ok());
        assert!(validate_duration(10).is_err());
        assert!(validate_duration(241).is_err());
    }

    #[test]
    fn cancellation_reason_bounds() {
        assert!(validate_cancellation_reason("Travelling").is_ok());
        assert!(validate_cancellation_reason("   ").is_err());
        assert!(validate_cancellation_reason(&"x".repeat(501)).is_err());
    }
}
