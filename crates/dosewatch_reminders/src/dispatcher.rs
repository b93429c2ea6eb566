// --- File: crates/dosewatch_reminders/src/dispatcher.rs ---
//! Fans a claimed reminder out to push, email and SMS.
//!
//! Channels are independent: each attempt ends in one history row, a failure
//! on one channel never stops the others, and nothing is retried within a
//! cycle.

use dosewatch_common::models::{DueReminder, Medication, PushSubscription, ReminderChannel, ReminderHistory};
use dosewatch_common::notifications::NotificationPayload;
use dosewatch_common::services::{DeliveryError, NotificationResult};
use dosewatch_db::{PushSubscriptionRepository, ReminderHistoryRepository};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::context::ReminderContext;
use crate::error::ReminderError;
use crate::rescheduler::reschedule;
use crate::selector::{claim, select_due};
use crate::templates::{reminder_email, reminder_push, reminder_sms};

/// Counters for one dispatch cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DispatchReport {
    pub due: usize,
    pub claimed: usize,
    pub attempts: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub subscriptions_removed: usize,
    pub rescheduled: usize,
}

/// Runs one full cycle: select, then claim, dispatch and reschedule each
/// reminder in turn.
///
/// Each claim is taken right before its reminder is sent, so a lease only has
/// to outlast one reminder's deliveries.
///
/// # Errors
///
/// Database errors from selection, claiming or rescheduling abort the cycle.
/// A reminder claimed but not yet rescheduled becomes due again when its
/// lease expires.
pub async fn run_dispatch_cycle(ctx: &ReminderContext) -> Result<DispatchReport, ReminderError> {
    let now = ctx.clock.now();
    let due = select_due(ctx, now).await?;

    let mut report = DispatchReport {
        due: due.len(),
        ..DispatchReport::default()
    };

    for reminder in &due {
        let Some(lease_until) = claim(ctx, reminder).await? else {
            continue;
        };
        report.claimed += 1;

        dispatch_reminder(ctx, reminder, &mut report).await?;
        if reschedule(ctx, &reminder.medication, lease_until)
            .await?
            .is_some()
        {
            report.rescheduled += 1;
        }
    }

    info!(
        "Dispatch cycle finished: {} claimed, {} attempt(s), {} succeeded, {} failed",
        report.claimed, report.attempts, report.succeeded, report.failed
    );
    Ok(report)
}

/// Sends every enabled channel for one medication.
pub async fn dispatch_reminder(
    ctx: &ReminderContext,
    reminder: &DueReminder,
    report: &mut DispatchReport,
) -> Result<(), ReminderError> {
    let medication = &reminder.medication;
    let contact = &reminder.contact;
    debug!("Dispatching reminder for medication {}", medication.id);

    if ctx.push.is_some() && contact.push_enabled {
        let subscriptions = ctx.subscriptions.find_by_user(&medication.user_id).await?;
        if subscriptions.is_empty() {
            debug!("User {} has no push subscriptions", medication.user_id);
        }
        let payload = NotificationPayload::Push(reminder_push(
            medication,
            &ctx.settings.push_click_url,
            ctx.settings.push_sound.as_deref(),
        ));

        for subscription in &subscriptions {
            let result = deliver(ctx, &payload, Some(subscription)).await;
            if let Err(err) = &result {
                if err.is_gone() && remove_subscription(ctx, subscription).await {
                    report.subscriptions_removed += 1;
                }
            }
            record(ctx, medication, ReminderChannel::Push, result, report).await;
        }
    }

    if ctx.email.is_some() {
        if let Some(to) = contact.email_target() {
            let payload = NotificationPayload::Email(reminder_email(medication, to));
            let result = deliver(ctx, &payload, None).await;
            record(ctx, medication, ReminderChannel::Email, result, report).await;
        }
    }

    if ctx.sms.is_some() {
        if let Some(to) = contact.sms_target() {
            let links = snooze_links(ctx, medication);
            let payload = NotificationPayload::Sms(reminder_sms(medication, to, &links));
            let result = deliver(ctx, &payload, None).await;
            record(ctx, medication, ReminderChannel::Sms, result, report).await;
        }
    }

    Ok(())
}

/// Validates the payload and hands it to the matching sender.
pub(crate) async fn deliver(
    ctx: &ReminderContext,
    payload: &NotificationPayload,
    subscription: Option<&PushSubscription>,
) -> Result<NotificationResult, DeliveryError> {
    payload.validate()?;

    match payload {
        NotificationPayload::Push(push) => {
            let sender = ctx
                .push
                .as_ref()
                .ok_or_else(|| DeliveryError::NotConfigured("push".into()))?;
            let subscription = subscription.ok_or_else(|| {
                DeliveryError::InvalidPayload("push payload without a subscription".into())
            })?;
            sender.send_push(subscription, push).await
        }
        NotificationPayload::Email(email) => {
            let sender = ctx
                .email
                .as_ref()
                .ok_or_else(|| DeliveryError::NotConfigured("email".into()))?;
            sender.send_email(email).await
        }
        NotificationPayload::Sms(sms) => {
            let sender = ctx
                .sms
                .as_ref()
                .ok_or_else(|| DeliveryError::NotConfigured("sms".into()))?;
            sender.send_sms(sms).await
        }
    }
}

fn snooze_links(ctx: &ReminderContext, medication: &Medication) -> Vec<(u32, String)> {
    let Some(signer) = ctx.links.as_ref().filter(|_| ctx.settings.sms_snooze_links) else {
        return Vec::new();
    };
    let now = ctx.clock.now();

    ctx.settings
        .snooze_link_hours
        .iter()
        .filter_map(|&hours| {
            match signer.link(&medication.id, hours, now, ctx.settings.snooze_link_ttl) {
                Ok(link) => Some((hours, link)),
                Err(err) => {
                    warn!("Skipping {}h snooze link for {}: {}", hours, medication.id, err);
                    None
                }
            }
        })
        .collect()
}

/// Deletes a subscription the push service reported as gone. Returns `true`
/// when this call removed it; failures are logged only.
pub(crate) async fn remove_subscription(
    ctx: &ReminderContext,
    subscription: &PushSubscription,
) -> bool {
    match ctx.subscriptions.delete_by_endpoint(&subscription.endpoint).await {
        Ok(true) => {
            info!(
                "Removed expired push subscription {} of user {}",
                subscription.id, subscription.user_id
            );
            true
        }
        Ok(false) => {
            debug!("Push subscription {} was already removed", subscription.id);
            false
        }
        Err(err) => {
            error!(
                "Failed to remove expired push subscription {}: {}",
                subscription.id, err
            );
            false
        }
    }
}

async fn record(
    ctx: &ReminderContext,
    medication: &Medication,
    channel: ReminderChannel,
    result: Result<NotificationResult, DeliveryError>,
    report: &mut DispatchReport,
) {
    report.attempts += 1;
    let sent_at = ctx.clock.now();

    let entry = match result {
        Ok(sent) => {
            debug!("{} reminder for {} delivered ({})", channel, medication.id, sent.id);
            report.succeeded += 1;
            ReminderHistory::success(medication, channel, sent_at)
        }
        Err(err) => {
            warn!("{} reminder for {} failed: {}", channel, medication.id, err);
            report.failed += 1;
            ReminderHistory::failed(medication, channel, err.to_string(), sent_at)
        }
    };

    if let Err(err) = ctx.history.insert(&entry).await {
        error!(
            "Failed to record {} history for medication {}: {}",
            channel, medication.id, err
        );
    }
}
