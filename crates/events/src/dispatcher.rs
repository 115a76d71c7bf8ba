//! Turns domain events into user notifications.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel, loads the entity each event refers to, and notifies
//! the users involved. The actor who caused an event is not notified about
//! it, except that a new booking is always confirmed to its customer. The
//! loop shuts down when the bus sender is dropped.

use atelier_core::audit::{actions, resources};
use atelier_core::types::DbId;
use atelier_db::models::user::User;
use atelier_db::repositories::{
    AppointmentRepo, InvoiceRepo, MeasurementRepo, OrderRepo, UserRepo,
};
use atelier_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::messages::{self, NotificationMessage};
use crate::notifier::Notifier;

pub struct NotificationDispatcher {
    pool: DbPool,
    notifier: Notifier,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    /// Run the dispatch loop until the bus closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            source_id = ?event.source_entity_id,
                            "Failed to dispatch notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification dispatcher lagged, some events were not notified"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Notify the users affected by a single event.
    ///
    /// Events without a source id, or whose source row no longer exists,
    /// are ignored.
    pub async fn handle(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        let Some(source_id) = event.source_entity_id else {
            return Ok(());
        };
        let actor = event.actor_user_id;

        match event.event_type.as_str() {
            actions::APPOINTMENT_CREATED => {
                let Some(appt) = AppointmentRepo::find_by_id(&self.pool, source_id).await? else {
                    return Ok(());
                };
                let related = Some((resources::APPOINTMENT, appt.id));
                let confirmed = self
                    .send_to(
                        vec![appt.customer_id],
                        &messages::appointment_booked(&appt),
                        related,
                    )
                    .await?;
                self.send_to(
                    recipients(&[appt.tailor_id], actor),
                    &messages::appointment_assigned(&appt),
                    related,
                )
                .await?;
                if confirmed > 0 {
                    AppointmentRepo::mark_confirmation_sent(&self.pool, appt.id).await?;
                }
            }
            actions::APPOINTMENT_CANCELLED => {
                let Some(appt) = AppointmentRepo::find_by_id(&self.pool, source_id).await? else {
                    return Ok(());
                };
                self.send_to(
                    recipients(&[Some(appt.customer_id), appt.tailor_id], actor),
                    &messages::appointment_cancelled(&appt),
                    Some((resources::APPOINTMENT, appt.id)),
                )
                .await?;
            }
            actions::APPOINTMENT_STATUS_CHANGED => {
                let Some(appt) = AppointmentRepo::find_by_id(&self.pool, source_id).await? else {
                    return Ok(());
                };
                self.send_to(
                    recipients(&[Some(appt.customer_id)], actor),
                    &messages::appointment_status_changed(&appt),
                    Some((resources::APPOINTMENT, appt.id)),
                )
                .await?;
            }
            actions::ORDER_STATUS_CHANGED => {
                let Some(order) = OrderRepo::find_by_id(&self.pool, source_id).await? else {
                    return Ok(());
                };
                self.send_to(
                    recipients(&[Some(order.customer_id)], actor),
                    &messages::order_status_changed(&order),
                    Some((resources::ORDER, order.id)),
                )
                .await?;
            }
            actions::INVOICE_CREATED => {
                let Some(invoice) = InvoiceRepo::find_by_id(&self.pool, source_id).await? else {
                    return Ok(());
                };
                self.send_to(
                    recipients(&[Some(invoice.customer_id)], actor),
                    &messages::invoice_created(&invoice),
                    Some((resources::INVOICE, invoice.id)),
                )
                .await?;
            }
            actions::TAILOR_APPROVED | actions::TAILOR_REJECTED => {
                let notes = event.payload.get("notes").and_then(|v| v.as_str());
                let message = if event.event_type == actions::TAILOR_APPROVED {
                    messages::tailor_approved(notes)
                } else {
                    messages::tailor_rejected(notes)
                };
                self.send_to(
                    vec![source_id],
                    &message,
                    Some((resources::USER, source_id)),
                )
                .await?;
            }
            actions::MEASUREMENT_APPROVED | actions::MEASUREMENT_REJECTED => {
                let Some(profile) = MeasurementRepo::find_profile(&self.pool, source_id).await?
                else {
                    return Ok(());
                };
                let message = if event.event_type == actions::MEASUREMENT_APPROVED {
                    messages::measurement_approved(&profile)
                } else {
                    messages::measurement_rejected(&profile)
                };
                self.send_to(
                    recipients(&[Some(profile.customer_id)], actor),
                    &message,
                    Some((resources::MEASUREMENT_PROFILE, profile.id)),
                )
                .await?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Notify each existing user; returns how many were notified.
    async fn send_to(
        &self,
        user_ids: Vec<DbId>,
        message: &NotificationMessage,
        related: Option<(&str, DbId)>,
    ) -> Result<usize, sqlx::Error> {
        let mut sent = 0;
        for user_id in user_ids {
            let Some(user) = UserRepo::find_by_id(&self.pool, user_id).await? else {
                continue;
            };
            self.notify_user(&user, message, related).await?;
            sent += 1;
        }
        Ok(sent)
    }

    async fn notify_user(
        &self,
        user: &User,
        message: &NotificationMessage,
        related: Option<(&str, DbId)>,
    ) -> Result<(), sqlx::Error> {
        self.notifier.notify(user, message, related).await?;
        tracing::debug!(
            user_id = user.id,
            template = message.template,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Distinct present ids, minus the actor.
fn recipients(candidates: &[Option<DbId>], actor: Option<DbId>) -> Vec<DbId> {
    let mut out: Vec<DbId> = Vec::with_capacity(candidates.len());
    for id in candidates.iter().flatten() {
        if Some(*id) != actor && !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_is_excluded() {
        assert_eq!(recipients(&[Some(1), Some(2)], Some(1)), vec![2]);
    }

    #[test]
    fn missing_and_duplicate_ids_are_dropped() {
        assert_eq!(recipients(&[Some(3), None, Some(3)], None), vec![3]);
        assert!(recipients(&[None], Some(1)).is_empty());
    }
}
