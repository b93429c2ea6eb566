//! `PushSender` implementation backed by [`WebPushClient`].

use dosewatch_common::models::PushSubscription;
use dosewatch_common::notifications::PushPayload;
use dosewatch_common::services::{BoxFuture, DeliveryError, NotificationResult, PushSender};

use crate::client::{PushError, WebPushClient};

impl From<PushError> for DeliveryError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::Gone(status) => DeliveryError::Gone { status },
            PushError::ApiError { status, message } => DeliveryError::Rejected { status, message },
            PushError::RequestError(e) => DeliveryError::Transport(e.to_string()),
            PushError::ConfigError(msg) => DeliveryError::NotConfigured(msg),
            PushError::KeyError(_)
            | PushError::InvalidEndpoint(_)
            | PushError::EncryptionError(_)
            | PushError::SerializationError(_)
            | PushError::SigningError(_) => DeliveryError::InvalidPayload(err.to_string()),
            PushError::DbError(e) => DeliveryError::Transport(e.to_string()),
        }
    }
}

impl PushSender for WebPushClient {
    fn send_push(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> BoxFuture<'_, NotificationResult, DeliveryError> {
        let subscription = subscription.clone();
        let payload = payload.clone();

        Box::pin(async move {
            self.send(&subscription, &payload)
                .await
                .map_err(DeliveryError::from)
        })
    }
}
