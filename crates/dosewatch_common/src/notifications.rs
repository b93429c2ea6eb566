// --- File: crates/dosewatch_common/src/notifications.rs ---
//! Per-channel message payloads.
//!
//! Each channel has its own payload struct; [`NotificationPayload`] tags them
//! so the dispatcher can validate and route one value per attempt.

use serde::{Deserialize, Serialize};

use crate::models::ReminderChannel;
use crate::services::DeliveryError;

/// Largest push payload accepted before encryption.
pub const MAX_PUSH_PAYLOAD_BYTES: usize = 3800;
/// Twilio's limit for a single (multi-segment) message.
pub const MAX_SMS_CHARS: usize = 1600;

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushAction {
    pub action: String,
    pub title: String,
}

/// JSON document the service worker renders as a notification.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renotify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<PushAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum NotificationPayload {
    Push(PushPayload),
    Email(EmailMessage),
    Sms(SmsMessage),
}

impl NotificationPayload {
    pub fn channel(&self) -> ReminderChannel {
        match self {
            NotificationPayload::Push(_) => ReminderChannel::Push,
            NotificationPayload::Email(_) => ReminderChannel::Email,
            NotificationPayload::Sms(_) => ReminderChannel::Sms,
        }
    }

    /// Checks the payload before it is handed to a sender.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        match self {
            NotificationPayload::Push(push) => {
                require(&push.title, "push title")?;
                require(&push.body, "push body")?;
                let encoded = serde_json::to_vec(push)
                    .map_err(|e| DeliveryError::InvalidPayload(e.to_string()))?;
                if encoded.len() > MAX_PUSH_PAYLOAD_BYTES {
                    return Err(DeliveryError::InvalidPayload(format!(
                        "push payload is {} bytes, limit is {}",
                        encoded.len(),
                        MAX_PUSH_PAYLOAD_BYTES
                    )));
                }
                Ok(())
            }
            NotificationPayload::Email(email) => {
                require(&email.to, "email recipient")?;
                if !email.to.contains('@') {
                    return Err(DeliveryError::InvalidPayload(format!(
                        "'{}' is not an email address",
                        email.to
                    )));
                }
                require(&email.subject, "email subject")?;
                require(&email.html, "email body")
            }
            NotificationPayload::Sms(sms) => {
                require(&sms.to, "sms recipient")?;
                require(&sms.body, "sms body")?;
                let chars = sms.body.chars().count();
                if chars > MAX_SMS_CHARS {
                    return Err(DeliveryError::InvalidPayload(format!(
                        "sms body is {} characters, limit is {}",
                        chars, MAX_SMS_CHARS
                    )));
                }
                Ok(())
            }
        }
    }
}

fn require(value: &str, what: &str) -> Result<(), DeliveryError> {
    if value.trim().is_empty() {
        Err(DeliveryError::InvalidPayload(format!("{} is empty", what)))
    } else {
        Ok(())
    }
}
