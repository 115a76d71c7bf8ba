//! Authentication, authorization, and request-metadata extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaff`] -- Requires `admin` or `staff`.
//! - [`rbac::RequireTailorOrAdmin`] -- Requires `tailor` or `admin`.
//! - [`rbac::RequireWorkshop`] -- Requires `tailor`, `admin`, or `staff`.
//! - [`rbac::RequireTailor`] -- Requires `tailor`.
//! - [`client::ClientInfo`] -- Caller IP and user agent for audit entries.

pub mod auth;
pub mod client;
pub mod rbac;
