//! Appointment booking wizard: step definitions and presence validation.
//!
//! The wizard is a linear cursor over four steps. Each step only checks that
//! its fields are present; format and range checks happen when the finished
//! draft is turned into a [`BookingRequest`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::appointment::{
    validate_duration, AppointmentType, DEFAULT_DURATION_MINUTES, MAX_CUSTOMER_NOTES_LEN,
};
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The four steps of the booking wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Service,
    Tailor,
    Schedule,
    Review,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

impl BookingStep {
    /// Convert a 1-based step number to a `BookingStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Service),
            2 => Ok(Self::Tailor),
            3 => Ok(Self::Schedule),
            4 => Ok(Self::Review),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Service => 1,
            Self::Tailor => 2,
            Self::Schedule => 3,
            Self::Review => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Service => "Choose Service",
            Self::Tailor => "Choose Tailor",
            Self::Schedule => "Pick Date & Time",
            Self::Review => "Review & Confirm",
        }
    }

    /// The following step, or `None` at the last step.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    /// The preceding step, or `None` at the first step.
    pub fn prev(self) -> Option<Self> {
        self.to_number()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }

    /// All steps up to and including `self`.
    fn through(self) -> impl Iterator<Item = BookingStep> {
        (MIN_STEP..=self.to_number()).filter_map(|n| Self::from_number(n).ok())
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Fields gathered by the wizard so far. Everything is optional until the
/// owning step is validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    pub appointment_type: Option<String>,
    pub branch_id: Option<DbId>,
    pub tailor_id: Option<DbId>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub is_priority: bool,
    #[serde(default)]
    pub is_rush: bool,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

impl BookingDraft {
    /// Names of the fields required by `step` that are missing.
    pub fn missing_fields(&self, step: BookingStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            BookingStep::Service => {
                if blank(&self.appointment_type) {
                    missing.push("appointment_type");
                }
                if self.branch_id.is_none() {
                    missing.push("branch_id");
                }
            }
            BookingStep::Tailor => {
                if self.tailor_id.is_none() {
                    missing.push("tailor_id");
                }
            }
            BookingStep::Schedule => {
                if self.date.is_none() {
                    missing.push("date");
                }
                if self.time.is_none() {
                    missing.push("time");
                }
            }
            BookingStep::Review => {}
        }
        missing
    }

    /// Presence check for a single step.
    pub fn validate_step(&self, step: BookingStep) -> Result<(), CoreError> {
        let missing = self.missing_fields(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Step {} ({}) is missing: {}",
                step.to_number(),
                step.label(),
                missing.join(", ")
            )))
        }
    }

    /// First step (in order) whose presence check fails, if any.
    pub fn first_incomplete_step(&self) -> Option<BookingStep> {
        BookingStep::Review
            .through()
            .find(|s| !self.missing_fields(*s).is_empty())
    }

    /// Convert a complete draft into a validated booking request.
    pub fn into_request(self) -> Result<BookingRequest, CoreError> {
        if let Some(step) = self.first_incomplete_step() {
            self.validate_step(step)?;
        }

        let appointment_type = AppointmentType::parse(
            self.appointment_type.as_deref().unwrap_or_default().trim(),
        )?;
        let duration_minutes = self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        validate_duration(duration_minutes)?;

        let customer_notes = self
            .customer_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(notes) = &customer_notes {
            if notes.chars().count() > MAX_CUSTOMER_NOTES_LEN {
                return Err(CoreError::Validation(format!(
                    "customer_notes must be at most {MAX_CUSTOMER_NOTES_LEN} characters"
                )));
            }
        }

        // Presence of every field below was checked by `first_incomplete_step`.
        let (Some(branch_id), Some(tailor_id), Some(date), Some(time)) =
            (self.branch_id, self.tailor_id, self.date, self.time)
        else {
            return Err(CoreError::Validation("Booking is incomplete".into()));
        };

        Ok(BookingRequest {
            appointment_type,
            branch_id,
            tailor_id,
            scheduled_at: NaiveDateTime::new(date, time),
            duration_minutes,
            customer_notes,
            is_priority: self.is_priority,
            is_rush: self.is_rush,
        })
    }
}

/// A fully validated booking, ready to be inserted as an appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub appointment_type: AppointmentType,
    pub branch_id: DbId,
    pub tailor_id: DbId,
    /// Naive wall-clock time; interpreted as UTC by the caller.
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub customer_notes: Option<String>,
    pub is_priority: bool,
    pub is_rush: bool,
}

// ---------------------------------------------------------------------------
// Wizard cursor
// ---------------------------------------------------------------------------

/// Linear cursor over [`BookingStep`]s that only advances past valid steps.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    step: BookingStep,
    pub draft: BookingDraft,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new(BookingDraft::default())
    }
}

impl BookingWizard {
    pub fn new(draft: BookingDraft) -> Self {
        Self {
            step: BookingStep::Service,
            draft,
        }
    }

    /// Resume at `step`, as when a client re-submits its cursor position.
    pub fn at(step: BookingStep, draft: BookingDraft) -> Self {
        Self { step, draft }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    /// Advance one step if the current step validates. Stays on the last step.
    pub fn next(&mut self) -> Result<BookingStep, CoreError> {
        self.draft.validate_step(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Go back one step, saturating at the first step.
    pub fn back(&mut self) -> BookingStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// `true` once every step's presence check passes.
    pub fn can_submit(&self) -> bool {
        self.draft.first_incomplete_step().is_none()
    }

    pub fn into_request(self) -> Result<BookingRequest, CoreError> {
        self.draft.into_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn complete_draft() -> BookingDraft {
        BookingDraft {
            appointment_type: Some("measurement".into()),
            branch_id: Some(1),
            tailor_id: Some(2),
            date: NaiveDate::from_ymd_opt(2026, 5, 4),
            time: NaiveTime::from_hms_opt(10, 30, 0),
            duration_minutes: None,
            customer_notes: Some("  first visit ".into()),
            is_priority: false,
            is_rush: false,
        }
    }

    #[test]
    fn step_numbers_round_trip() {
        for n in MIN_STEP..=MAX_STEP {
            assert_eq!(BookingStep::from_number(n).unwrap().to_number(), n);
        }
        assert!(BookingStep::from_number(0).is_err());
        assert!(BookingStep::from_number(5).is_err());
    }

    #[test]
    fn empty_draft_reports_missing_fields_per_step() {
        let draft = BookingDraft::default();
        assert_eq!(
            draft.missing_fields(BookingStep::Service),
            vec!["appointment_type", "branch_id"]
        );
        assert_eq!(draft.missing_fields(BookingStep::Tailor), vec!["tailor_id"]);
        assert_eq!(
            draft.missing_fields(BookingStep::Schedule),
            vec!["date", "time"]
        );
        assert!(draft.missing_fields(BookingStep::Review).is_empty());
    }

    #[test]
    fn blank_type_counts_as_missing() {
        let draft = BookingDraft {
            appointment_type: Some("   ".into()),
            branch_id: Some(1),
            ..Default::default()
        };
        assert_eq!(
            draft.missing_fields(BookingStep::Service),
            vec!["appointment_type"]
        );
    }

    #[test]
    fn wizard_does_not_advance_past_invalid_step() {
        let mut wizard = BookingWizard::default();
        assert_matches!(wizard.next(), Err(CoreError::Validation(_)));
        assert_eq!(wizard.step(), BookingStep::Service);

        wizard.draft.appointment_type = Some("fitting".into());
        wizard.draft.branch_id = Some(3);
        assert_eq!(wizard.next().unwrap(), BookingStep::Tailor);
        assert!(wizard.next().is_err());
    }

    #[test]
    fn wizard_walks_forward_and_back() {
        let mut wizard = BookingWizard::new(complete_draft());
        assert_eq!(wizard.next().unwrap(), BookingStep::Tailor);
        assert_eq!(wizard.next().unwrap(), BookingStep::Schedule);
        assert_eq!(wizard.next().unwrap(), BookingStep::Review);
        // Last step: stays put.
        assert_eq!(wizard.next().unwrap(), BookingStep::Review);

        assert_eq!(wizard.back(), BookingStep::Schedule);
        assert_eq!(wizard.back(), BookingStep::Tailor);
        assert_eq!(wizard.back(), BookingStep::Service);
        assert_eq!(wizard.back(), BookingStep::Service);
    }

    #[test]
    fn first_incomplete_step_is_reported_in_order() {
        let mut draft = complete_draft();
        draft.time = None;
        draft.tailor_id = None;
        assert_eq!(draft.first_incomplete_step(), Some(BookingStep::Tailor));
    }

    #[test]
    fn complete_draft_becomes_request() {
        let wizard = BookingWizard::at(BookingStep::Review, complete_draft());
        assert!(wizard.can_submit());

        let req = wizard.into_request().unwrap();
        assert_eq!(req.appointment_type, AppointmentType::Measurement);
        assert_eq!(req.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(req.customer_notes.as_deref(), Some("first visit"));
        assert_eq!(req.scheduled_at.to_string(), "2026-05-04 10:30:00");
    }

    #[test]
    fn incomplete_or_invalid_draft_is_rejected() {
        let mut draft = complete_draft();
        draft.date = None;
        assert_matches!(
            draft.into_request(),
            Err(CoreError::Validation(msg)) if msg.contains("date")
        );

        let mut draft = complete_draft();
        draft.appointment_type = Some("haircut".into());
        assert!(draft.into_request().is_err());

        let mut draft = complete_draft();
        draft.duration_minutes = Some(500);
        assert!(draft.into_request().is_err());

        let mut draft = complete_draft();
        draft.customer_notes = Some("n".repeat(1001));
        assert!(draft.into_request().is_err());
    }
}
