//! Tailor availability windows and appointment slot generation.
//!
//! This module lives in `core` (zero internal deps) so the slot rules can be
//! unit-tested without a database.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Availability bounds
// ---------------------------------------------------------------------------

pub const MIN_SLOT_MINUTES: i32 = 15;
pub const MAX_SLOT_MINUTES: i32 = 120;
pub const DEFAULT_SLOT_MINUTES: i32 = 30;

pub const MAX_BUFFER_MINUTES: i32 = 60;
pub const DEFAULT_BUFFER_MINUTES: i32 = 10;

pub const MIN_APPOINTMENTS_PER_DAY: i32 = 1;
pub const MAX_APPOINTMENTS_PER_DAY: i32 = 50;
pub const DEFAULT_APPOINTMENTS_PER_DAY: i32 = 16;

/// Lowercase weekday names as stored in `tailor_availability.day_of_week`.
pub const DAY_NAMES: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Lowercase name of the weekday of `date`.
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Validate the fields of an availability window before it is stored.
pub fn validate_availability(
    day_of_week: &str,
    start: NaiveTime,
    end: NaiveTime,
    slot_minutes: i32,
    buffer_minutes: i32,
    max_per_day: i32,
) -> Result<(), CoreError> {
    if !DAY_NAMES.contains(&day_of_week) {
        return Err(CoreError::Validation(format!(
            "Invalid day_of_week '{day_of_week}'"
        )));
    }
    if end <= start {
        return Err(CoreError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(&slot_minutes) {
        return Err(CoreError::Validation(format!(
            "slot_duration_minutes must be between {MIN_SLOT_MINUTES} and {MAX_SLOT_MINUTES}"
        )));
    }
    if !(0..=MAX_BUFFER_MINUTES).contains(&buffer_minutes) {
        return Err(CoreError::Validation(format!(
            "buffer_time_minutes must be between 0 and {MAX_BUFFER_MINUTES}"
        )));
    }
    if !(MIN_APPOINTMENTS_PER_DAY..=MAX_APPOINTMENTS_PER_DAY).contains(&max_per_day) {
        return Err(CoreError::Validation(format!(
            "max_appointments_per_day must be between {MIN_APPOINTMENTS_PER_DAY} and {MAX_APPOINTMENTS_PER_DAY}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// An already-booked interval on the tailor's calendar.
#[derive(Debug, Clone, Copy)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl BookedInterval {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// A bookable slot in an availability window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_available: bool,
}

/// Half-open interval overlap test.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Generate the slots of a window on `date`.
///
/// Slots start at `start` and advance by `slot_minutes`; a slot that would
/// run past `end` is not produced. A slot overlapping any `booked` interval
/// is returned with `is_available = false`.
pub fn generate_slots(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    slot_minutes: i32,
    booked: &[BookedInterval],
) -> Vec<TimeSlot> {
    if slot_minutes <= 0 {
        return Vec::new();
    }
    let step = Duration::minutes(i64::from(slot_minutes));
    let window_end = date.and_time(end).and_utc();
    let mut cursor = date.and_time(start).and_utc();
    let mut slots = Vec::new();

    while cursor + step <= window_end {
        let slot_end = cursor + step;
        let taken = booked
            .iter()
            .any(|b| overlaps(cursor, slot_end, b.start, b.end()));
        slots.push(TimeSlot {
            start_time: cursor,
            end_time: slot_end,
            is_available: !taken,
        });
        cursor = slot_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap() // a Monday
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn day_name_matches_weekday() {
        assert_eq!(day_name(date()), "monday");
        assert_eq!(day_name(date() + Duration::days(6)), "sunday");
    }

    #[test]
    fn generates_back_to_back_slots() {
        let slots = generate_slots(date(), time(9, 0), time(11, 0), 30, &[]);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start_time, date().and_time(time(9, 0)).and_utc());
        assert_eq!(slots[3].end_time, date().and_time(time(11, 0)).and_utc());
        assert!(slots.iter().all(|s| s.is_available));
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        let slots = generate_slots(date(), time(9, 0), time(10, 15), 30, &[]);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn booked_interval_blocks_every_overlapping_slot() {
        let booked = [BookedInterval {
            start: date().and_time(time(9, 15)).and_utc(),
            duration_minutes: 30,
        }];
        let slots = generate_slots(date(), time(9, 0), time(10, 30), 30, &booked);
        let availability: Vec<bool> = slots.iter().map(|s| s.is_available).collect();
        assert_eq!(availability, vec![false, false, true]);
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let booked = [BookedInterval {
            start: date().and_time(time(9, 30)).and_utc(),
            duration_minutes: 30,
        }];
        let slots = generate_slots(date(), time(9, 0), time(10, 30), 30, &booked);
        let availability: Vec<bool> = slots.iter().map(|s| s.is_available).collect();
        assert_eq!(availability, vec![true, false, true]);
    }

    #[test]
    fn zero_slot_length_yields_nothing() {
        assert!(generate_slots(date(), time(9, 0), time(10, 0), 0, &[]).is_empty());
    }

    #[test]
    fn availability_validation() {
        assert!(validate_availability("monday", time(9, 0), time(17, 0), 30, 10, 16).is_ok());
        assert!(validate_availability("funday", time(9, 0), time(17, 0), 30, 10, 16).is_err());
        assert!(validate_availability("monday", time(17, 0), time(9, 0), 30, 10, 16).is_err());
        assert!(validate_availability("monday", time(9, 0), time(17, 0), 5, 10, 16).is_err());
        assert!(validate_availability("monday", time(9, 0), time(17, 0), 30, 90, 16).is_err());
        assert!(validate_availability("monday", time(9, 0), time(17, 0), 30, 10, 0).is_err());
    }
}
