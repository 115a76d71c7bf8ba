//! Atelier event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the canonical domain event envelope.
//! - [`NotificationDispatcher`]: background service that turns domain
//!   events into in-app and email notifications.
//! - [`ReminderScheduler`]: daily appointment reminder emails.
//! - [`delivery`]: SMTP email delivery.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod messages;
pub mod notifier;
pub mod reminders;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use dispatcher::NotificationDispatcher;
pub use notifier::Notifier;
pub use reminders::{ReminderConfig, ReminderScheduler};
