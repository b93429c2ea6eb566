//! Repository for the shared VAPID key pair

use crate::error::DbError;
use dosewatch_common::models::VapidKeyPair;
use std::future::Future;

pub trait VapidKeyRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    /// The most recently created pair, if any.
    fn latest(&self) -> impl Future<Output = Result<Option<VapidKeyPair>, DbError>> + Send;

    fn insert(&self, pair: &VapidKeyPair) -> impl Future<Output = Result<(), DbError>> + Send;
}
