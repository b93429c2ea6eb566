// --- File: crates/dosewatch_common/src/services.rs ---
//! Channel sender abstractions.
//!
//! The reminder workflow only sees these traits; the push, email and Twilio
//! crates provide the implementations and tests provide in-memory fakes.
//! Every send resolves to `Result<NotificationResult, DeliveryError>`.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::models::PushSubscription;
use crate::notifications::{EmailMessage, PushPayload, SmsMessage};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Why a single delivery attempt failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    /// The push service reports the subscription no longer exists (404/410).
    #[error("Subscription is gone (HTTP {status})")]
    Gone { status: u16 },

    /// The provider answered with a non-success status.
    #[error("Provider rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a provider answer.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The payload failed validation or could not be encoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Channel not configured: {0}")]
    NotConfigured(String),
}

impl DeliveryError {
    pub fn is_gone(&self) -> bool {
        matches!(self, DeliveryError::Gone { .. })
    }
}

/// Provider acknowledgement of a delivered message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResult {
    /// Provider message id, or the push endpoint for web push.
    pub id: String,
    pub status: String,
}

/// Sends encrypted Web Push messages.
pub trait PushSender: Send + Sync {
    fn send_push(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> BoxFuture<'_, NotificationResult, DeliveryError>;
}

/// Sends transactional HTML email.
pub trait EmailSender: Send + Sync {
    fn send_email(&self, message: &EmailMessage) -> BoxFuture<'_, NotificationResult, DeliveryError>;
}

/// Sends plain-text SMS.
pub trait SmsSender: Send + Sync {
    fn send_sms(&self, message: &SmsMessage) -> BoxFuture<'_, NotificationResult, DeliveryError>;
}

/// Hands out the channel senders that are enabled in this process.
///
/// `None` means the channel is switched off or not configured; the dispatcher
/// then skips it without writing history.
pub trait ServiceFactory: Send + Sync {
    fn push_sender(&self) -> Option<Arc<dyn PushSender>>;

    fn email_sender(&self) -> Option<Arc<dyn EmailSender>>;

    fn sms_sender(&self) -> Option<Arc<dyn SmsSender>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_detection() {
        assert!(DeliveryError::Gone { status: 410 }.is_gone());
        assert!(!DeliveryError::Rejected {
            status: 500,
            message: "boom".into()
        }
        .is_gone());
    }

    #[test]
    fn test_rejected_message_mentions_status() {
        let err = DeliveryError::Rejected {
            status: 401,
            message: "invalid api key".into(),
        };
        assert_eq!(
            err.to_string(),
            "Provider rejected the request (HTTP 401): invalid api key"
        );
    }
}
