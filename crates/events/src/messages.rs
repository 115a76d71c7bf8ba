//! Subject and body text for customer and tailor notifications.
//!
//! Pure functions over db rows so the wording can be tested without a
//! database or an SMTP server.

use atelier_db::models::appointment::Appointment;
use atelier_db::models::invoice::Invoice;
use atelier_db::models::measurement::MeasurementProfile;
use atelier_db::models::order::Order;

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub template: &'static str,
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    fn new(template: &'static str, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            template,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Turn `snake_case` identifiers into words for display.
fn humanize(value: &str) -> String {
    value.replace('_', " ")
}

fn when(appointment: &Appointment) -> String {
    appointment
        .scheduled_at
        .format("%A, %d %B %Y at %H:%M UTC")
        .to_string()
}

pub fn appointment_booked(appointment: &Appointment) -> NotificationMessage {
    NotificationMessage::new(
        "appointment_booked",
        "Appointment booked",
        format!(
            "Your {} appointment is booked for {} ({} minutes).",
            humanize(&appointment.appointment_type),
            when(appointment),
            appointment.duration_minutes
        ),
    )
}

pub fn appointment_assigned(appointment: &Appointment) -> NotificationMessage {
    NotificationMessage::new(
        "appointment_assigned",
        "New appointment assigned",
        format!(
            "A {} appointment has been booked with you for {}.",
            humanize(&appointment.appointment_type),
            when(appointment)
        ),
    )
}

pub fn appointment_cancelled(appointment: &Appointment) -> NotificationMessage {
    let reason = appointment
        .cancellation_reason
        .as_deref()
        .map(|r| format!(" Reason: {r}"))
        .unwrap_or_default();
    NotificationMessage::new(
        "appointment_cancelled",
        "Appointment cancelled",
        format!(
            "The appointment on {} has been cancelled.{reason}",
            when(appointment)
        ),
    )
}

pub fn appointment_status_changed(appointment: &Appointment) -> NotificationMessage {
    NotificationMessage::new(
        "appointment_status_changed",
        "Appointment update",
        format!(
            "Your appointment on {} is now {}.",
            when(appointment),
            humanize(&appointment.status)
        ),
    )
}

pub fn appointment_reminder(appointment: &Appointment) -> NotificationMessage {
    NotificationMessage::new(
        "appointment_reminder",
        "Appointment reminder",
        format!(
            "Reminder: your {} appointment is tomorrow, {}.",
            humanize(&appointment.appointment_type),
            when(appointment)
        ),
    )
}

pub fn order_status_changed(order: &Order) -> NotificationMessage {
    NotificationMessage::new(
        "order_status_changed",
        format!("Order {} update", order.order_number),
        format!(
            "Your {} (order {}) is now {}.",
            order.garment_type,
            order.order_number,
            humanize(&order.status)
        ),
    )
}

pub fn invoice_created(invoice: &Invoice) -> NotificationMessage {
    NotificationMessage::new(
        "invoice_created",
        format!("Invoice {}", invoice.invoice_number),
        format!(
            "Invoice {} for {:.2} has been issued and is due on {}.",
            invoice.invoice_number,
            invoice.total_amount,
            invoice.due_date.format("%d %B %Y")
        ),
    )
}

pub fn tailor_approved(notes: Option<&str>) -> NotificationMessage {
    let mut body =
        "Your tailor application has been approved. You can now sign in and set your availability."
            .to_string();
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!(" Notes: {notes}"));
    }
    NotificationMessage::new("tailor_approved", "Application approved", body)
}

pub fn tailor_rejected(notes: Option<&str>) -> NotificationMessage {
    let mut body = "Your tailor application was not approved.".to_string();
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!(" Reason: {notes}"));
    }
    NotificationMessage::new("tailor_rejected", "Application update", body)
}

pub fn measurement_approved(profile: &MeasurementProfile) -> NotificationMessage {
    NotificationMessage::new(
        "measurement_approved",
        "Measurements approved",
        format!(
            "Your measurement profile \"{}\" (version {}) has been approved.",
            profile.profile_name, profile.current_version
        ),
    )
}

pub fn measurement_rejected(profile: &MeasurementProfile) -> NotificationMessage {
    let mut body = format!(
        "Your measurement profile \"{}\" needs another look before we can use it.",
        profile.profile_name
    );
    if let Some(reason) = profile
        .rejection_reason
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        body.push_str(&format!(" Reason: {reason}"));
    }
    NotificationMessage::new("measurement_rejected", "Measurements need review", body)
}

pub fn test_email() -> NotificationMessage {
    NotificationMessage::new(
        "test_email",
        "Test email",
        "This is a test email. SMTP delivery is working.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn appointment() -> Appointment {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 10, 30, 0).unwrap();
        Appointment {
            id: 1,
            customer_id: 2,
            tailor_id: Some(3),
            branch_id: 4,
            appointment_type: "first_fitting".into(),
            status: "in_progress".into(),
            scheduled_at: at,
            duration_minutes: 45,
            is_priority: false,
            is_rush: false,
            rush_fee: None,
            customer_notes: None,
            tailor_notes: None,
            cancellation_reason: None,
            confirmation_sent: false,
            reminder_sent: false,
            original_appointment_id: None,
            reschedule_count: 0,
            cancelled_at: None,
            completed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn booking_message_names_type_and_time() {
        let msg = appointment_booked(&appointment());
        assert_eq!(msg.template, "appointment_booked");
        assert_eq!(
            msg.body,
            "Your first fitting appointment is booked for Saturday, 14 March 2026 at 10:30 UTC (45 minutes)."
        );
    }

    #[test]
    fn cancellation_includes_reason_when_present() {
        let mut a = appointment();
        assert!(!appointment_cancelled(&a).body.contains("Reason"));
        a.cancellation_reason = Some("Travelling".into());
        assert!(appointment_cancelled(&a).body.ends_with("Reason: Travelling"));
    }

    #[test]
    fn status_change_is_humanized() {
        let msg = appointment_status_changed(&appointment());
        assert!(msg.body.ends_with("is now in progress."));
    }

    #[test]
    fn invoice_message_formats_amount_and_due_date() {
        let now = Utc::now();
        let invoice = Invoice {
            id: 1,
            order_id: 1,
            customer_id: 2,
            invoice_number: "INV-20260314-1234".into(),
            subtotal: 1000.0,
            tax_amount: 180.0,
            discount_amount: 0.0,
            total_amount: 1180.0,
            paid_amount: 0.0,
            status: "pending".into(),
            payment_method: None,
            payment_reference: None,
            payment_date: None,
            issue_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 13).unwrap(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let msg = invoice_created(&invoice);
        assert_eq!(msg.subject, "Invoice INV-20260314-1234");
        assert!(msg.body.contains("1180.00"));
        assert!(msg.body.contains("13 April 2026"));
    }

    #[test]
    fn measurement_rejection_carries_reason() {
        let now = Utc::now();
        let mut profile = MeasurementProfile {
            id: 1,
            customer_id: 2,
            profile_name: "Wedding".into(),
            is_default: true,
            current_version: 2,
            status: "rejected".into(),
            approved_by_id: None,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!measurement_rejected(&profile).body.contains("Reason"));
        profile.rejection_reason = Some("Chest looks off".into());
        assert!(measurement_rejected(&profile).body.ends_with("Reason: Chest looks off"));
        assert!(measurement_approved(&profile).body.contains("version 2"));
    }

    #[test]
    fn tailor_review_notes_are_optional() {
        assert!(!tailor_approved(None).body.contains("Notes"));
        assert!(!tailor_rejected(Some("  ")).body.contains("Reason"));
        assert!(tailor_rejected(Some("Incomplete portfolio"))
            .body
            .ends_with("Reason: Incomplete portfolio"));
    }
}
