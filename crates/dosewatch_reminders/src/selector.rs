//! Picks the reminders that are due and claims them one at a time.

use chrono::{DateTime, Utc};
use dosewatch_common::models::DueReminder;
use dosewatch_db::MedicationRepository;
use tracing::{debug, info};

use crate::context::ReminderContext;
use crate::error::ReminderError;

/// Loads the reminders due at `now`, oldest first. Nothing is claimed yet.
pub async fn select_due(
    ctx: &ReminderContext,
    now: DateTime<Utc>,
) -> Result<Vec<DueReminder>, ReminderError> {
    let due = ctx.medications.find_due(now).await?;
    info!("{} reminder(s) due", due.len());
    Ok(due)
}

/// Leases one due reminder by moving its `next_reminder` to
/// `now + claim_lease`, read from the clock at claim time.
///
/// Returns the lease value, or `None` when another cycle claimed or changed
/// the row since it was selected. A crashed cycle's lease runs out and the
/// reminder is picked up again.
pub async fn claim(
    ctx: &ReminderContext,
    reminder: &DueReminder,
) -> Result<Option<DateTime<Utc>>, ReminderError> {
    let Some(observed) = reminder.medication.next_reminder else {
        return Ok(None);
    };
    let lease_until = ctx.clock.now() + ctx.settings.claim_lease;

    if ctx
        .medications
        .claim(&reminder.medication.id, observed, lease_until)
        .await?
    {
        Ok(Some(lease_until))
    } else {
        debug!(
            "Medication {} was claimed by another cycle",
            reminder.medication.id
        );
        Ok(None)
    }
}
