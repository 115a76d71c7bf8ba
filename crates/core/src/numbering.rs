//! Human-facing document numbers for orders and invoices.
//!
//! Format: `PREFIX-YYYYMMDD-NNNN` where `NNNN` is a random 4-digit suffix.
//! Uniqueness is enforced by the database; callers retry on conflict.

use chrono::NaiveDate;
use rand::Rng;

pub const ORDER_PREFIX: &str = "ORD";
pub const INVOICE_PREFIX: &str = "INV";

/// Number of attempts callers should make before giving up on a collision.
pub const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Format a document number from its parts.
pub fn format_number(prefix: &str, date: NaiveDate, suffix: u16) -> String {
    format!("{prefix}-{}-{:04}", date.format("%Y%m%d"), suffix % 10_000)
}

fn random_suffix() -> u16 {
    rand::rng().random_range(1000..10_000)
}

pub fn order_number(date: NaiveDate) -> String {
    format_number(ORDER_PREFIX, date, random_suffix())
}

pub fn invoice_number(date: NaiveDate) -> String {
    format_number(INVOICE_PREFIX, date, random_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 9).unwrap()
    }

    #[test]
    fn format_pads_suffix() {
        assert_eq!(format_number("ORD", date(), 42), "ORD-20260709-0042");
    }

    #[test]
    fn generated_numbers_have_expected_shape() {
        let order = order_number(date());
        assert!(order.starts_with("ORD-20260709-"));
        assert_eq!(order.len(), "ORD-20260709-1234".len());

        let invoice = invoice_number(date());
        assert!(invoice.starts_with("INV-20260709-"));
        let suffix: u16 = invoice.rsplit('-').next().unwrap().parse().unwrap();
        assert!((1000..10_000).contains(&suffix));
    }
}
