//! Repository traits and their SQL implementations, one pair per table.

pub mod factory;
pub mod medication;
pub mod medication_sql;
pub mod profile;
pub mod profile_sql;
pub mod push_subscription;
pub mod push_subscription_sql;
pub mod reminder_history;
pub mod reminder_history_sql;
pub mod vapid_key;
pub mod vapid_key_sql;

pub use factory::SqlRepositoryFactory;
pub use medication::MedicationRepository;
pub use medication_sql::SqlMedicationRepository;
pub use profile::ProfileRepository;
pub use profile_sql::SqlProfileRepository;
pub use push_subscription::PushSubscriptionRepository;
pub use push_subscription_sql::SqlPushSubscriptionRepository;
pub use reminder_history::{HistoryFilter, ReminderHistoryRepository};
pub use reminder_history_sql::SqlReminderHistoryRepository;
pub use vapid_key::VapidKeyRepository;
pub use vapid_key_sql::SqlVapidKeyRepository;
