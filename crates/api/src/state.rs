use std::sync::Arc;

use atelier_events::{EventBus, Notifier, PlatformEvent};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<EventBus>,
    /// Direct notification sender, for requests that notify synchronously
    /// (the admin test email).
    pub notifier: Notifier,
}

impl AppState {
    /// Publish a domain event. Delivery is fire-and-forget.
    pub fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }
}
