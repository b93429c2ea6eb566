//! Pushes one medication's next reminder forward.

use chrono::{DateTime, Utc};
use dosewatch_common::models::{ContactPreferences, ReminderChannel, ReminderHistory};
use dosewatch_db::{MedicationRepository, ProfileRepository, ReminderHistoryRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::ReminderContext;
use crate::error::ReminderError;
use crate::interval::snooze_duration;
use crate::links::SnoozeLinkQuery;
use crate::templates::snooze_email;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SnoozeRequest {
    pub medication_id: String,
    /// Hours, fractions allowed
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SnoozeResponse {
    pub success: bool,
    pub next_reminder: DateTime<Utc>,
}

/// Sets `next_reminder = now + hours`, confirms by email when the user has
/// email reminders on, and records a `snooze` history row.
///
/// A failed confirmation email is logged only; the snooze itself stands.
pub async fn snooze(
    ctx: &ReminderContext,
    medication_id: &str,
    hours: f64,
) -> Result<SnoozeResponse, ReminderError> {
    let duration = snooze_duration(hours, ctx.settings.max_snooze_hours)?;

    let medication = ctx
        .medications
        .find_by_id(medication_id)
        .await?
        .ok_or_else(|| ReminderError::NotFound(format!("Medication {}", medication_id)))?;
    let contact = ctx
        .profiles
        .find_by_id(&medication.user_id)
        .await?
        .map(|p| p.contact_preferences())
        .unwrap_or_else(ContactPreferences::default);

    let now = ctx.clock.now();
    let next_reminder = now + duration;
    if !ctx
        .medications
        .update_next_reminder(&medication.id, next_reminder, now)
        .await?
    {
        return Err(ReminderError::NotFound(format!("Medication {}", medication_id)));
    }
    info!("Medication {} snoozed until {}", medication.id, next_reminder);

    if let (Some(sender), Some(to)) = (ctx.email.as_ref(), contact.email_target()) {
        let message = snooze_email(&medication, to, next_reminder, ctx.settings.display_timezone);
        if let Err(err) = sender.send_email(&message).await {
            warn!(
                "Snooze confirmation for medication {} was not sent: {}",
                medication.id, err
            );
        }
    }

    ctx.history
        .insert(&ReminderHistory::success(
            &medication,
            ReminderChannel::Snooze,
            now,
        ))
        .await?;

    Ok(SnoozeResponse {
        success: true,
        next_reminder,
    })
}

/// Verifies a signed snooze link and applies it.
pub async fn snooze_from_link(
    ctx: &ReminderContext,
    query: &SnoozeLinkQuery,
) -> Result<SnoozeResponse, ReminderError> {
    let signer = ctx
        .links
        .as_ref()
        .ok_or_else(|| ReminderError::Unauthorized("snooze links are disabled".into()))?;
    signer.verify(query, ctx.clock.now())?;
    snooze(ctx, &query.medication_id, f64::from(query.hours)).await
}
