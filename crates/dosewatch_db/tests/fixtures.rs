//! Test fixtures for repository tests
//!
//! Every test gets its own SQLite file under the system temp directory; the
//! `Any` pool opens several connections, so `:memory:` would not be shared.

use chrono::{DateTime, Duration, TimeZone, Utc};
use dosewatch_common::models::{Medication, Profile, PushSubscription};
use dosewatch_db::{
    DbClient, MedicationRepository, ProfileRepository, PushSubscriptionRepository,
    RepositoryFactory, ReminderHistoryRepository, SqlMedicationRepository, SqlProfileRepository,
    SqlPushSubscriptionRepository, SqlReminderHistoryRepository, SqlRepositoryFactory,
    SqlVapidKeyRepository, VapidKeyRepository,
};

pub struct TestDb {
    pub medications: SqlMedicationRepository,
    pub profiles: SqlProfileRepository,
    pub subscriptions: SqlPushSubscriptionRepository,
    pub history: SqlReminderHistoryRepository,
    pub vapid_keys: SqlVapidKeyRepository,
}

pub async fn test_db() -> TestDb {
    let path = std::env::temp_dir().join(format!("dosewatch-db-test-{}.db", uuid::Uuid::new_v4()));
    let db_client = DbClient::from_url(&format!("sqlite://{}", path.display()))
        .await
        .expect("open test database");

    let factory = SqlRepositoryFactory::new();
    let db = TestDb {
        medications: factory.create_repository(db_client.clone()),
        profiles: factory.create_repository(db_client.clone()),
        subscriptions: factory.create_repository(db_client.clone()),
        history: factory.create_repository(db_client.clone()),
        vapid_keys: factory.create_repository(db_client),
    };

    db.medications.init_schema().await.expect("medications schema");
    db.profiles.init_schema().await.expect("profiles schema");
    db.subscriptions.init_schema().await.expect("subscriptions schema");
    db.history.init_schema().await.expect("history schema");
    db.vapid_keys.init_schema().await.expect("vapid schema");
    db
}

/// 2026-03-01 08:00:00 UTC
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

pub fn medication(id: &str, user_id: &str, next_reminder: Option<DateTime<Utc>>) -> Medication {
    let created = base_time() - Duration::days(1);
    Medication {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: "Lisinopril".to_string(),
        dosage: "10mg".to_string(),
        frequency: "Every 12 hours".to_string(),
        interval_hours: 12,
        time_of_day: vec!["08:00".to_string(), "20:00".to_string()],
        notes: None,
        image_url: None,
        reminder_enabled: true,
        next_reminder,
        created_at: created,
        updated_at: created,
    }
}

pub fn profile(user_id: &str) -> Profile {
    Profile {
        id: user_id.to_string(),
        email: Some("ana@example.com".to_string()),
        phone_number: Some("+15550001111".to_string()),
        name: Some("Ana".to_string()),
        email_reminder_enabled: true,
        sms_reminder_enabled: false,
        push_reminder_enabled: true,
        created_at: base_time(),
        updated_at: base_time(),
    }
}

pub fn subscription(id: &str, user_id: &str, endpoint: &str) -> PushSubscription {
    PushSubscription {
        id: id.to_string(),
        user_id: user_id.to_string(),
        endpoint: endpoint.to_string(),
        p256dh: "BB_0AU5Zv5Ra_XQHWcbk6_lfB1Lkm4xmgaspHv56dq4iIyfsnaA58GI14DsT7cPtbYfr0Jh7f8L6Dy5N9hDBRyE".to_string(),
        auth: "k1-dY0pa72rj6bZ4yjrtug".to_string(),
        created_at: base_time(),
    }
}
