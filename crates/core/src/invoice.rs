//! Invoice arithmetic, payment methods, and payment-driven status changes.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default number of days between issue and due date.
pub const DEFAULT_DUE_DAYS: i64 = 7;

/// Upper bound for `due_days` on invoice creation.
pub const MAX_DUE_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Status and payment method
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid invoice status '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::PartiallyPaid => "partially_paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Payments can be recorded against any invoice that is neither settled
    /// nor cancelled.
    pub fn accepts_payment(&self) -> bool {
        !matches!(self, Self::Paid | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Razorpay,
    Stripe,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "bank_transfer" => Ok(Self::BankTransfer),
            "razorpay" => Ok(Self::Razorpay),
            "stripe" => Ok(Self::Stripe),
            _ => Err(CoreError::Validation(format!(
                "Invalid payment method '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::BankTransfer => "bank_transfer",
            Self::Razorpay => "razorpay",
            Self::Stripe => "stripe",
        }
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

/// Round a currency amount to 2 decimal places.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `subtotal + tax - discount`, rounded to cents.
///
/// All inputs must be non-negative and the discount may not exceed
/// `subtotal + tax`.
pub fn compute_total(subtotal: f64, tax: f64, discount: f64) -> Result<f64, CoreError> {
    for (name, value) in [
        ("subtotal", subtotal),
        ("tax_amount", tax),
        ("discount_amount", discount),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "{name} must be a non-negative amount"
            )));
        }
    }
    let total = round_money(subtotal + tax - discount);
    if total < 0.0 {
        return Err(CoreError::Validation(
            "discount_amount cannot exceed subtotal plus tax".into(),
        ));
    }
    Ok(total)
}

/// Status after the paid amount changes.
///
/// Fully covered → `paid`; anything paid → `partially_paid`; otherwise the
/// current status is kept.
pub fn status_after_payment(current: InvoiceStatus, total: f64, paid: f64) -> InvoiceStatus {
    if paid >= total {
        InvoiceStatus::Paid
    } else if paid > 0.0 {
        InvoiceStatus::PartiallyPaid
    } else {
        current
    }
}

/// Validate a payment amount against the outstanding balance.
pub fn validate_payment(total: f64, already_paid: f64, amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(
            "Payment amount must be greater than zero".into(),
        ));
    }
    let outstanding = round_money(total - already_paid);
    if round_money(amount) > outstanding {
        return Err(CoreError::Validation(format!(
            "Payment amount exceeds outstanding balance of {outstanding:.2}"
        )));
    }
    Ok(())
}

/// Due date for an invoice issued on `issue_date`.
pub fn due_date(issue_date: NaiveDate, due_days: Option<i64>) -> Result<NaiveDate, CoreError> {
    let days = due_days.unwrap_or(DEFAULT_DUE_DAYS);
    if !(0..=MAX_DUE_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "due_days must be between 0 and {MAX_DUE_DAYS}"
        )));
    }
    Ok(issue_date + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn total_is_subtotal_plus_tax_minus_discount() {
        assert_eq!(compute_total(1000.0, 180.0, 50.0).unwrap(), 1130.0);
        assert_eq!(compute_total(0.1, 0.2, 0.0).unwrap(), 0.3);
    }

    #[test]
    fn negative_inputs_and_oversized_discount_are_rejected() {
        assert_matches!(compute_total(-1.0, 0.0, 0.0), Err(CoreError::Validation(_)));
        assert_matches!(compute_total(100.0, 0.0, 150.0), Err(CoreError::Validation(_)));
        assert!(compute_total(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn payment_status_derivation() {
        assert_eq!(
            status_after_payment(InvoiceStatus::Pending, 100.0, 100.0),
            InvoiceStatus::Paid
        );
        assert_eq!(
            status_after_payment(InvoiceStatus::Pending, 100.0, 40.0),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!(
            status_after_payment(InvoiceStatus::Draft, 100.0, 0.0),
            InvoiceStatus::Draft
        );
    }

    #[test]
    fn payment_validation() {
        assert!(validate_payment(100.0, 40.0, 60.0).is_ok());
        assert!(validate_payment(100.0, 40.0, 60.01).is_err());
        assert!(validate_payment(100.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn due_date_defaults_to_a_week() {
        let issued = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        assert_eq!(
            due_date(issued, None).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
        assert!(due_date(issued, Some(-1)).is_err());
        assert!(due_date(issued, Some(400)).is_err());
    }

    #[test]
    fn settled_invoices_reject_payments() {
        assert!(InvoiceStatus::PartiallyPaid.accepts_payment());
        assert!(!InvoiceStatus::Paid.accepts_payment());
        assert!(!InvoiceStatus::Cancelled.accepts_payment());
    }

    #[test]
    fn payment_method_parse() {
        assert_eq!(PaymentMethod::parse("upi").unwrap(), PaymentMethod::Upi);
        assert_eq!(PaymentMethod::BankTransfer.as_str(), "bank_transfer");
        assert!(PaymentMethod::parse("cheque").is_err());
    }
}
