//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

mod filter;

pub mod appointment_repo;
pub mod audit_repo;
pub mod availability_repo;
pub mod branch_repo;
pub mod fabric_repo;
pub mod invoice_repo;
pub mod measurement_repo;
pub mod notification_repo;
pub mod order_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use appointment_repo::AppointmentRepo;
pub use audit_repo::AuditLogRepo;
pub use availability_repo::AvailabilityRepo;
pub use branch_repo::BranchRepo;
pub use fabric_repo::FabricRepo;
pub use invoice_repo::InvoiceRepo;
pub use measurement_repo::MeasurementRepo;
pub use notification_repo::NotificationRepo;
pub use order_repo::OrderRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
