use chrono::{DateTime, Utc};
use dosewatch_common::models::Medication;
use dosewatch_db::MedicationRepository;
use tracing::{info, warn};

use crate::context::ReminderContext;
use crate::error::ReminderError;
use crate::interval::next_after;

/// Moves `next_reminder` one interval past the current clock reading and
/// releases the claim taken by the selector.
///
/// Returns `None` when the row no longer holds `lease_until`: a snooze, an
/// edit or a delete landed during dispatch and its value is kept.
pub async fn reschedule(
    ctx: &ReminderContext,
    medication: &Medication,
    lease_until: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ReminderError> {
    let now = ctx.clock.now();
    let next = next_after(now, medication.interval_hours);

    if ctx
        .medications
        .release_claim(&medication.id, lease_until, next, now)
        .await?
    {
        info!("Medication {} rescheduled for {}", medication.id, next);
        Ok(Some(next))
    } else {
        warn!(
            "Medication {} changed during dispatch; keeping its new schedule",
            medication.id
        );
        Ok(None)
    }
}
