//! Repository for browser push subscriptions

use crate::error::DbError;
use dosewatch_common::models::PushSubscription;
use std::future::Future;

pub trait PushSubscriptionRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Insert the subscription, or refresh owner and keys of the row that
    /// already has this endpoint. Returns the stored row.
    fn upsert(
        &self,
        subscription: &PushSubscription,
    ) -> impl Future<Output = Result<PushSubscription, DbError>> + Send;

    fn find_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<PushSubscription>, DbError>> + Send;

    fn find_by_endpoint(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Option<PushSubscription>, DbError>> + Send;

    /// Returns `true` if a row was removed.
    fn delete_by_endpoint(&self, endpoint: &str)
        -> impl Future<Output = Result<bool, DbError>> + Send;
}
