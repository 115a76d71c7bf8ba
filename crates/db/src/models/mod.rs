//! Row models and DTOs, one module per table group.

pub mod appointment;
pub mod audit;
pub mod availability;
pub mod branch;
pub mod fabric;
pub mod invoice;
pub mod measurement;
pub mod notification;
pub mod order;
pub mod session;
pub mod stats;
pub mod user;
