//! `EmailSender` implementation for [`EmailClient`].

use dosewatch_common::notifications::EmailMessage;
use dosewatch_common::services::{BoxFuture, DeliveryError, EmailSender, NotificationResult};

use crate::client::{EmailClient, EmailError};

impl From<EmailError> for DeliveryError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::RequestError(e) => DeliveryError::Transport(e.to_string()),
            EmailError::ApiError {
                status_code,
                message,
            } => DeliveryError::Rejected {
                status: status_code,
                message,
            },
            EmailError::ConfigError(msg) => DeliveryError::NotConfigured(msg),
            EmailError::InvalidMessage(msg) => DeliveryError::InvalidPayload(msg),
        }
    }
}

impl EmailSender for EmailClient {
    fn send_email(&self, message: &EmailMessage) -> BoxFuture<'_, NotificationResult, DeliveryError> {
        let message = message.clone();

        Box::pin(async move {
            let sent = self.send(&message).await?;
            Ok(NotificationResult {
                id: sent.id,
                status: "sent".to_string(),
            })
        })
    }
}
