//! Repository for medications and their reminder schedule

use crate::error::DbError;
use chrono::{DateTime, Utc};
use dosewatch_common::models::{DueReminder, Medication};
use std::future::Future;

pub trait MedicationRepository {
    /// Create the `medications` table and its due-index if they don't exist.
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn create(&self, medication: &Medication)
        -> impl Future<Output = Result<Medication, DbError>> + Send;

    fn find_by_id(&self, id: &str)
        -> impl Future<Output = Result<Option<Medication>, DbError>> + Send;

    fn find_by_user(&self, user_id: &str)
        -> impl Future<Output = Result<Vec<Medication>, DbError>> + Send;

    /// Overwrite every editable column. Returns `false` when the id is unknown.
    fn update(&self, medication: &Medication)
        -> impl Future<Output = Result<bool, DbError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Medications with reminders enabled whose `next_reminder` is at or before
    /// `now`, joined with the owner's contact preferences. Ordered by
    /// `next_reminder`, then id.
    fn find_due(&self, now: DateTime<Utc>)
        -> impl Future<Output = Result<Vec<DueReminder>, DbError>> + Send;

    /// Compare-and-set `next_reminder` from `observed` to `lease_until`.
    ///
    /// Returns `true` only for the caller whose update hit the row, so two
    /// overlapping dispatch cycles never both own the same reminder.
    fn claim(
        &self,
        id: &str,
        observed: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Moves a claimed reminder on, but only while `next_reminder` still
    /// holds the `lease_until` value written by [`Self::claim`]. Returns
    /// `false` when a snooze or edit replaced it in the meantime.
    fn release_claim(
        &self,
        id: &str,
        lease_until: DateTime<Utc>,
        next_reminder: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Store a new `next_reminder` (snooze). Returns `false` when the id is
    /// unknown.
    fn update_next_reminder(
        &self,
        id: &str,
        next_reminder: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;
}
