//! On-demand push to every device a user has registered.
//!
//! Unlike a reminder, an on-demand push writes no history rows and does not
//! touch any schedule. Subscriptions the push service reports as gone are
//! deleted the same way a dispatch cycle deletes them.

use dosewatch_common::notifications::{NotificationPayload, PushPayload};
use dosewatch_db::PushSubscriptionRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::ReminderContext;
use crate::dispatcher::{deliver, remove_subscription};
use crate::error::ReminderError;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PushSendRequest {
    pub user_id: String,
    pub title: String,
    pub body: String,
    /// Page opened on click; the configured click URL when absent
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PushSendReport {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub subscriptions_removed: usize,
}

/// Sends one notification to all of `user_id`'s subscriptions.
///
/// Per-device failures are counted and logged; the call still succeeds.
pub async fn send_push_to_user(
    ctx: &ReminderContext,
    request: &PushSendRequest,
) -> Result<PushSendReport, ReminderError> {
    if request.user_id.trim().is_empty() {
        return Err(ReminderError::Validation("userId must not be empty".into()));
    }
    if ctx.push.is_none() {
        return Err(ReminderError::Unavailable("Push notifications are not configured".into()));
    }

    let payload = NotificationPayload::Push(PushPayload {
        title: request.title.clone(),
        body: request.body.clone(),
        url: request
            .url
            .clone()
            .unwrap_or_else(|| ctx.settings.push_click_url.clone()),
        sound: ctx.settings.push_sound.clone(),
        tag: None,
        renotify: None,
        actions: None,
        vibrate: None,
    });
    payload
        .validate()
        .map_err(|err| ReminderError::Validation(err.to_string()))?;

    let subscriptions = ctx.subscriptions.find_by_user(&request.user_id).await?;
    let mut report = PushSendReport {
        success: true,
        ..PushSendReport::default()
    };

    for subscription in &subscriptions {
        match deliver(ctx, &payload, Some(subscription)).await {
            Ok(_) => report.sent += 1,
            Err(err) => {
                warn!("Push to subscription {} failed: {}", subscription.id, err);
                report.failed += 1;
                if err.is_gone() && remove_subscription(ctx, subscription).await {
                    report.subscriptions_removed += 1;
                }
            }
        }
    }

    info!(
        "On-demand push for user {}: {} sent, {} failed",
        request.user_id, report.sent, report.failed
    );
    Ok(report)
}
