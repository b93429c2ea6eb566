//! Factory for creating SQL repositories from a shared database client

use crate::repositories::{
    SqlMedicationRepository, SqlProfileRepository, SqlPushSubscriptionRepository,
    SqlReminderHistoryRepository, SqlVapidKeyRepository,
};
use crate::{DbClient, RepositoryFactory};

/// Builds every SQL repository over the same connection pool.
#[derive(Debug, Clone, Default)]
pub struct SqlRepositoryFactory;

impl SqlRepositoryFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlMedicationRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlMedicationRepository {
        SqlMedicationRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlProfileRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlProfileRepository {
        SqlProfileRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlPushSubscriptionRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlPushSubscriptionRepository {
        SqlPushSubscriptionRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlReminderHistoryRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlReminderHistoryRepository {
        SqlReminderHistoryRepository::new(db_client)
    }
}

impl RepositoryFactory<SqlVapidKeyRepository, DbClient> for SqlRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlVapidKeyRepository {
        SqlVapidKeyRepository::new(db_client)
    }
}
