//! Domain rules for the atelier platform.
//!
//! This crate has no internal dependencies and no I/O: status enums and
//! transitions, the booking wizard, slot generation, catalog filters,
//! invoice arithmetic, measurement checks, and fit recommendations all live
//! here so they can be unit-tested in isolation.

pub mod appointment;
pub mod audit;
pub mod booking;
pub mod channels;
pub mod error;
pub mod fabric;
pub mod fit;
pub mod invoice;
pub mod measurement;
pub mod numbering;
pub mod order;
pub mod pagination;
pub mod roles;
pub mod scheduling;
pub mod types;
