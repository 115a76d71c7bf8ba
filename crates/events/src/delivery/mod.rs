//! External delivery channels for notifications.
//!
//! Only email is sent today; SMS and WhatsApp notifications are stored
//! with status `pending` and never leave the platform.

pub mod email;
