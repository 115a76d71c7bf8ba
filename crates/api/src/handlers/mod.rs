//! Request handlers, one module per resource.
//!
//! Handlers delegate persistence to the repositories in `atelier_db`, domain
//! rules to `atelier_core`, and map failures through [`crate::error::AppError`].

pub mod admin;
pub mod analytics;
pub mod appointments;
pub mod audit;
pub mod auth;
pub mod branches;
pub mod fabrics;
pub mod invoices;
pub mod measurements;
pub mod notifications;
pub mod orders;
pub mod search;
pub mod tailor;
pub mod tailor_applications;
pub mod users;
