//! Database integration for DoseWatch
//!
//! A database-agnostic client on top of sqlx's `Any` driver plus one
//! repository per table: medications, profiles, push subscriptions, reminder
//! history and VAPID keys. SQLite is the default backend; Postgres and MySQL
//! are available through features.
//!
//! ```rust,no_run
//! use dosewatch_db::{DbClient, MedicationRepository, RepositoryFactory, SqlMedicationRepository, SqlRepositoryFactory};
//!
//! async fn setup() -> Result<(), dosewatch_db::error::DbError> {
//!     let db_client = DbClient::from_url("sqlite://data/dosewatch.db").await?;
//!     let medications: SqlMedicationRepository =
//!         SqlRepositoryFactory::new().create_repository(db_client);
//!     medications.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use repository::RepositoryFactory;

pub use repositories::{
    HistoryFilter, MedicationRepository, ProfileRepository, PushSubscriptionRepository,
    ReminderHistoryRepository, SqlMedicationRepository, SqlProfileRepository,
    SqlPushSubscriptionRepository, SqlReminderHistoryRepository, SqlRepositoryFactory,
    SqlVapidKeyRepository, VapidKeyRepository,
};
