//! Daily appointment reminder scheduler.
//!
//! [`ReminderScheduler`] wakes once a day at the configured UTC hour, finds
//! confirmed appointments scheduled for the following calendar day whose
//! reminder has not been sent, and emails each customer. An appointment is
//! flagged `reminder_sent` once its notification row exists, whether or not
//! SMTP accepted the message; failed rows are visible in the customer's
//! notification list.

use std::time::Duration;

use atelier_core::audit::resources;
use atelier_core::types::Timestamp;
use atelier_db::models::appointment::Appointment;
use atelier_db::repositories::{AppointmentRepo, UserRepo};
use atelier_db::DbPool;
use chrono::{Days, NaiveTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::messages;
use crate::notifier::Notifier;

/// Hour of day (UTC) reminders go out when `REMINDER_HOUR_UTC` is unset.
const DEFAULT_REMINDER_HOUR: u32 = 8;

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// 0 to 23.
    pub hour_utc: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            hour_utc: DEFAULT_REMINDER_HOUR,
        }
    }
}

impl ReminderConfig {
    /// | Variable            | Default |
    /// |---------------------|---------|
    /// | `REMINDER_HOUR_UTC` | `8`     |
    ///
    /// Out-of-range values fall back to the default.
    pub fn from_env() -> Self {
        let hour_utc = std::env::var("REMINDER_HOUR_UTC")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|h| *h < 24)
            .unwrap_or(DEFAULT_REMINDER_HOUR);
        Self { hour_utc }
    }
}

/// The first instant strictly after `now` at `hour:00` UTC.
pub fn next_run_after(now: Timestamp, hour: u32) -> Timestamp {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// `[start, end)` of the UTC calendar day after `now`.
pub fn tomorrow_window(now: Timestamp) -> (Timestamp, Timestamp) {
    let today = now.date_naive();
    let start = today + Days::new(1);
    let end = today + Days::new(2);
    (
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    )
}

pub struct ReminderScheduler {
    pool: DbPool,
    notifier: Notifier,
    config: ReminderConfig,
}

impl ReminderScheduler {
    pub fn new(pool: DbPool, notifier: Notifier, config: ReminderConfig) -> Self {
        Self {
            pool,
            notifier,
            config,
        }
    }

    /// Sleep until the next run time, send reminders, repeat. Exits when
    /// `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.config.hour_utc);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(next_run = %next, "Reminder scheduler sleeping");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    match self.send_due_reminders(Utc::now()).await {
                        Ok(0) => {}
                        Ok(count) => tracing::info!(count, "Appointment reminders sent"),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to send appointment reminders")
                        }
                    }
                }
            }
        }
    }

    /// Send reminders for appointments falling on the day after `now`.
    /// Returns how many appointments were flagged.
    ///
    /// A failure on one appointment is logged and the rest of the batch
    /// still goes out; only the initial lookup error is returned.
    pub async fn send_due_reminders(&self, now: Timestamp) -> Result<usize, sqlx::Error> {
        let (from, to) = tomorrow_window(now);
        let due = AppointmentRepo::list_due_reminders(&self.pool, from, to).await?;

        let mut sent = 0;
        for appt in &due {
            match self.remind(appt).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    appointment_id = appt.id,
                    customer_id = appt.customer_id,
                    error = %e,
                    "Failed to send appointment reminder"
                ),
            }
        }
        Ok(sent)
    }

    async fn remind(&self, appt: &Appointment) -> Result<bool, sqlx::Error> {
        let Some(customer) = UserRepo::find_by_id(&self.pool, appt.customer_id).await? else {
            tracing::warn!(appointment_id = appt.id, "Reminder skipped, customer missing");
            return Ok(false);
        };
        self.notifier
            .email(
                &customer,
                &messages::appointment_reminder(appt),
                Some((resources::APPOINTMENT, appt.id)),
            )
            .await?;
        AppointmentRepo::mark_reminder_sent(&self.pool, appt.id).await
    }
}
