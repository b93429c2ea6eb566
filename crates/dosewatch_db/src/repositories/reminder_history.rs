//! Repository for the append-only reminder history

use crate::error::DbError;
use dosewatch_common::models::ReminderHistory;
use std::future::Future;

/// Optional filters for [`ReminderHistoryRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub medication_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<u32>,
}

/// Rows are only ever inserted; there is no update or delete.
pub trait ReminderHistoryRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert(&self, entry: &ReminderHistory) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Newest first.
    fn list(
        &self,
        filter: &HistoryFilter,
    ) -> impl Future<Output = Result<Vec<ReminderHistory>, DbError>> + Send;
}
