//! Records notifications and, for email, attempts delivery.
//!
//! Every notification is stored first. In-app rows are stored as `sent`.
//! Email rows start `pending`; if a mailer is configured the send result
//! moves them to `sent` or `failed`, otherwise they stay `pending`.

use std::sync::Arc;

use atelier_core::channels::{CHANNEL_EMAIL, CHANNEL_IN_APP, STATUS_PENDING, STATUS_SENT};
use atelier_core::types::DbId;
use atelier_db::models::notification::{CreateNotification, Notification};
use atelier_db::models::user::User;
use atelier_db::repositories::NotificationRepo;
use atelier_db::DbPool;

use crate::delivery::email::EmailDelivery;
use crate::messages::NotificationMessage;

/// The entity a notification refers to, e.g. `("appointment", 12)`.
pub type RelatedResource<'a> = Option<(&'a str, DbId)>;

#[derive(Clone)]
pub struct Notifier {
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
}

impl Notifier {
    pub fn new(pool: DbPool, email: Option<Arc<EmailDelivery>>) -> Self {
        Self { pool, email }
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    /// Store an in-app notification for `user_id`.
    pub async fn in_app(
        &self,
        user_id: DbId,
        message: &NotificationMessage,
        related: RelatedResource<'_>,
    ) -> Result<Notification, sqlx::Error> {
        let input = build(user_id, CHANNEL_IN_APP, STATUS_SENT, message, related, None);
        NotificationRepo::create(&self.pool, &input).await
    }

    /// Store an email notification for `user` and try to deliver it.
    ///
    /// Delivery failures are recorded on the row, not returned.
    pub async fn email(
        &self,
        user: &User,
        message: &NotificationMessage,
        related: RelatedResource<'_>,
    ) -> Result<Notification, sqlx::Error> {
        let input = build(
            user.id,
            CHANNEL_EMAIL,
            STATUS_PENDING,
            message,
            related,
            Some(user.email.clone()),
        );
        let notification = NotificationRepo::create(&self.pool, &input).await?;

        let Some(mailer) = &self.email else {
            tracing::debug!(
                notification_id = notification.id,
                "SMTP not configured, email notification left pending"
            );
            return Ok(notification);
        };

        match mailer.send(&user.email, &message.subject, &message.body).await {
            Ok(()) => {
                NotificationRepo::mark_sent(&self.pool, notification.id).await?;
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = notification.id,
                    user_id = user.id,
                    error = %e,
                    "Email delivery failed"
                );
                NotificationRepo::mark_failed(&self.pool, notification.id, &e.to_string()).await?;
            }
        }

        NotificationRepo::find_by_id(&self.pool, notification.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// In-app always, plus email when SMTP is configured.
    pub async fn notify(
        &self,
        user: &User,
        message: &NotificationMessage,
        related: RelatedResource<'_>,
    ) -> Result<(), sqlx::Error> {
        self.in_app(user.id, message, related).await?;
        if self.email_enabled() {
            self.email(user, message, related).await?;
        }
        Ok(())
    }
}

fn build(
    user_id: DbId,
    channel: &str,
    status: &str,
    message: &NotificationMessage,
    related: RelatedResource<'_>,
    recipient_address: Option<String>,
) -> CreateNotification {
    CreateNotification {
        user_id,
        channel: channel.to_string(),
        status: status.to_string(),
        subject: Some(message.subject.clone()),
        message: message.body.clone(),
        template_name: Some(message.template.to_string()),
        related_resource_type: related.map(|(kind, _)| kind.to_string()),
        related_resource_id: related.map(|(_, id)| id),
        recipient_address,
    }
}
