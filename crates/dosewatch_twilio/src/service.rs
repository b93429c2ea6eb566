use dosewatch_common::notifications::SmsMessage;
use dosewatch_common::services::{BoxFuture, DeliveryError, NotificationResult, SmsSender};
use thiserror::Error;

use crate::twilio_sms::TwilioSmsClient;

/// Twilio-specific error types.
#[derive(Error, Debug)]
pub enum TwilioError {
    /// Error occurred during a Twilio API request
    #[error("Twilio API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Twilio API
    #[error("Twilio API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Missing or incomplete Twilio configuration
    #[error("Twilio configuration missing or incomplete")]
    ConfigError,

    #[error("Invalid SMS: {0}")]
    InvalidMessage(String),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl From<TwilioError> for DeliveryError {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::RequestError(e) => DeliveryError::Transport(e.to_string()),
            TwilioError::ApiError {
                status_code,
                message,
            } => DeliveryError::Rejected {
                status: status_code,
                message,
            },
            TwilioError::ConfigError => DeliveryError::NotConfigured("twilio".into()),
            TwilioError::InvalidMessage(msg) => DeliveryError::InvalidPayload(msg),
            TwilioError::InternalError(msg) => DeliveryError::Transport(msg),
        }
    }
}

impl SmsSender for TwilioSmsClient {
    fn send_sms(&self, message: &SmsMessage) -> BoxFuture<'_, NotificationResult, DeliveryError> {
        let message = message.clone();

        Box::pin(async move {
            let sent = TwilioSmsClient::send_sms(self, &message).await?;
            Ok(NotificationResult {
                id: sent.sid,
                status: sent.status.unwrap_or_else(|| "queued".to_string()),
            })
        })
    }
}
