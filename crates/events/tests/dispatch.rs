//! Dispatcher and reminder scheduler against a real database, without SMTP.

use atelier_core::measurement::{FitPreference, Measurements};
use atelier_db::models::appointment::CreateAppointment;
use atelier_db::models::branch::CreateBranch;
use atelier_db::models::measurement::{CreateProfile, CreateVersion, ProfileReview};
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::{
    AppointmentRepo, BranchRepo, MeasurementRepo, NotificationRepo, UserRepo,
};
use atelier_events::{
    EventBus, NotificationDispatcher, Notifier, PlatformEvent, ReminderConfig, ReminderScheduler,
};
use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;

async fn user(pool: &PgPool, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            phone: None,
            password_hash: "hash".to_string(),
            full_name: email.to_string(),
            role: role.to_string(),
            account_status: "active".to_string(),
            experience_years: None,
            specialization: None,
            bio: None,
        },
    )
    .await
    .unwrap()
}

async fn branch(pool: &PgPool) -> i64 {
    BranchRepo::create(
        pool,
        &CreateBranch {
            name: "Main".into(),
            code: "MAIN".into(),
            address: "1 Main St".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
            phone: None,
            email: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn booking(
    customer: i64,
    tailor: i64,
    branch: i64,
    at: chrono::DateTime<Utc>,
) -> CreateAppointment {
    CreateAppointment {
        customer_id: customer,
        tailor_id: Some(tailor),
        branch_id: branch,
        appointment_type: "measurement".into(),
        scheduled_at: at,
        duration_minutes: 30,
        is_priority: false,
        is_rush: false,
        customer_notes: None,
    }
}

async fn inbox(pool: &PgPool, user_id: i64) -> Vec<atelier_db::models::notification::Notification> {
    NotificationRepo::list_for_user(pool, user_id, false, None, 50, 0)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_confirms_to_customer_and_notifies_tailor(pool: PgPool) {
    let customer = user(&pool, "c@example.com", "customer").await;
    let tailor = user(&pool, "t@example.com", "tailor").await;
    let branch = branch(&pool).await;
    let at = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();
    let appt = AppointmentRepo::create_if_free(&pool, &booking(customer.id, tailor.id, branch, at))
        .await
        .unwrap()
        .unwrap();

    let dispatcher = NotificationDispatcher::new(pool.clone(), Notifier::new(pool.clone(), None));
    let event = PlatformEvent::new("appointment.created")
        .with_source("appointment", appt.id)
        .with_actor(customer.id);
    dispatcher.handle(&event).await.unwrap();

    // The customer booked it themselves and still gets the confirmation.
    let customer_inbox = inbox(&pool, customer.id).await;
    assert_eq!(customer_inbox.len(), 1);
    assert_eq!(customer_inbox[0].template_name.as_deref(), Some("appointment_booked"));
    let tailor_inbox = inbox(&pool, tailor.id).await;
    assert_eq!(tailor_inbox.len(), 1);
    assert_eq!(tailor_inbox[0].channel, "in_app");
    assert_eq!(tailor_inbox[0].status, "sent");
    assert_eq!(tailor_inbox[0].related_resource_id, Some(appt.id));

    let appt = AppointmentRepo::find_by_id(&pool, appt.id).await.unwrap().unwrap();
    assert!(appt.confirmation_sent);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_measurement_review_notifies_customer(pool: PgPool) {
    let customer = user(&pool, "c@example.com", "customer").await;
    let tailor = user(&pool, "t@example.com", "tailor").await;
    let (profile, _) = MeasurementRepo::create_profile(
        &pool,
        &CreateProfile {
            customer_id: customer.id,
            profile_name: "Wedding".into(),
            is_default: true,
        },
        &CreateVersion {
            measurements: Measurements {
                chest: Some(98.0),
                ..Default::default()
            },
            additional_measurements: None,
            fit_preference: FitPreference::Regular,
            posture_notes: None,
            special_requirements: None,
            measured_by_id: Some(tailor.id),
            measurement_method: "manual".into(),
            change_notes: None,
        },
    )
    .await
    .unwrap();
    MeasurementRepo::review(
        &pool,
        profile.id,
        &ProfileReview {
            approved: false,
            reviewer_id: tailor.id,
            notes: Some("Sleeve length missing".into()),
        },
    )
    .await
    .unwrap();

    let dispatcher = NotificationDispatcher::new(pool.clone(), Notifier::new(pool.clone(), None));
    let event = PlatformEvent::new("measurement.rejected")
        .with_source("measurement_profile", profile.id)
        .with_actor(tailor.id);
    dispatcher.handle(&event).await.unwrap();

    let notes = inbox(&pool, customer.id).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].template_name.as_deref(), Some("measurement_rejected"));
    assert!(notes[0].message.ends_with("Reason: Sleeve length missing"));
    assert!(inbox(&pool, tailor.id).await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dispatcher_loop_exits_when_bus_drops(pool: PgPool) {
    let applicant = user(&pool, "new-tailor@example.com", "tailor").await;
    let bus = EventBus::default();
    let dispatcher = NotificationDispatcher::new(pool.clone(), Notifier::new(pool.clone(), None));
    let handle = tokio::spawn(dispatcher.run(bus.subscribe()));

    bus.publish(
        PlatformEvent::new("tailor.rejected")
            .with_source("user", applicant.id)
            .with_payload(serde_json::json!({ "notes": "Incomplete portfolio" })),
    );
    drop(bus);
    handle.await.unwrap();

    let notes = inbox(&pool, applicant.id).await;
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.contains("Incomplete portfolio"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reminders_go_out_once_for_confirmed_appointments(pool: PgPool) {
    let customer = user(&pool, "c@example.com", "customer").await;
    let tailor = user(&pool, "t@example.com", "tailor").await;
    let branch = branch(&pool).await;
    let now = Utc.with_ymd_and_hms(2026, 5, 3, 8, 0, 0).unwrap();
    let tomorrow = now + Duration::hours(26);

    let confirmed =
        AppointmentRepo::create_if_free(&pool, &booking(customer.id, tailor.id, branch, tomorrow))
            .await
            .unwrap()
            .unwrap();
    AppointmentRepo::update_status(&pool, confirmed.id, "confirmed", None)
        .await
        .unwrap();
    // Still pending: no reminder.
    AppointmentRepo::create_if_free(
        &pool,
        &booking(customer.id, tailor.id, branch, tomorrow + Duration::hours(2)),
    )
    .await
    .unwrap()
    .unwrap();

    let scheduler = ReminderScheduler::new(
        pool.clone(),
        Notifier::new(pool.clone(), None),
        ReminderConfig::default(),
    );
    assert_eq!(scheduler.send_due_reminders(now).await.unwrap(), 1);
    assert_eq!(scheduler.send_due_reminders(now).await.unwrap(), 0);

    let notes = inbox(&pool, customer.id).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].channel, "email");
    assert_eq!(notes[0].status, "pending");
    assert_eq!(notes[0].recipient_address.as_deref(), Some("c@example.com"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_failed_reminder_does_not_stop_the_batch(pool: PgPool) {
    let broken = user(&pool, "broken@example.com", "customer").await;
    let customer = user(&pool, "c@example.com", "customer").await;
    let tailor = user(&pool, "t@example.com", "tailor").await;
    let branch = branch(&pool).await;
    let now = Utc.with_ymd_and_hms(2026, 5, 3, 8, 0, 0).unwrap();
    let tomorrow = now + Duration::hours(26);

    // The broken customer's appointment comes first in the batch.
    for (customer_id, at) in [
        (broken.id, tomorrow),
        (customer.id, tomorrow + Duration::hours(1)),
    ] {
        let appt =
            AppointmentRepo::create_if_free(&pool, &booking(customer_id, tailor.id, branch, at))
                .await
                .unwrap()
                .unwrap();
        AppointmentRepo::update_status(&pool, appt.id, "confirmed", None)
            .await
            .unwrap();
    }

    sqlx::query(
        "CREATE FUNCTION reject_broken_recipient() RETURNS trigger AS $$
         BEGIN
             IF NEW.recipient_address = 'broken@example.com' THEN
                 RAISE EXCEPTION 'mailbox unavailable';
             END IF;
             RETURN NEW;
         END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_broken_recipient BEFORE INSERT ON notifications
         FOR EACH ROW EXECUTE FUNCTION reject_broken_recipient()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let scheduler = ReminderScheduler::new(
        pool.clone(),
        Notifier::new(pool.clone(), None),
        ReminderConfig::default(),
    );
    assert_eq!(scheduler.send_due_reminders(now).await.unwrap(), 1);

    assert_eq!(inbox(&pool, customer.id).await.len(), 1);
    assert!(inbox(&pool, broken.id).await.is_empty());
}
