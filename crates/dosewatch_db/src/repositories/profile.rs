//! Repository for user profiles (contact details and channel preferences)

use crate::error::DbError;
use dosewatch_common::models::Profile;
use std::future::Future;

pub trait ProfileRepository {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Profile>, DbError>> + Send;

    /// Insert or replace the profile keyed by its id. `created_at` of an
    /// existing row is kept.
    fn upsert(&self, profile: &Profile) -> impl Future<Output = Result<Profile, DbError>> + Send;
}
