//! Web Push client
//!
//! Encrypts the payload with `aes128gcm` (RFC 8291), signs a VAPID token for
//! the endpoint's origin and POSTs the result to the browser's push service.

use chrono::Utc;
use dosewatch_common::models::PushSubscription;
use dosewatch_common::notifications::PushPayload;
use dosewatch_common::services::NotificationResult;
use dosewatch_config::PushConfig;
use dosewatch_db::DbError;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};
use web_push::{ContentEncoding, SubscriptionInfo, WebPushMessageBuilder};

use crate::vapid::{VapidKeys, VapidSigner};

/// Errors that can occur when sending Web Push messages
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// A subscription or VAPID key is malformed
    #[error("Invalid key: {0}")]
    KeyError(String),

    #[error("Invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Payload encryption failed: {0}")]
    EncryptionError(String),

    #[error("VAPID signing failed: {0}")]
    SigningError(#[from] jsonwebtoken::errors::Error),

    #[error("Payload serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The push service says the subscription expired or was revoked
    #[error("Subscription gone (HTTP {0})")]
    Gone(u16),

    #[error("Push service error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Database error: {0}")]
    DbError(#[from] DbError),
}

impl From<web_push::WebPushError> for PushError {
    fn from(err: web_push::WebPushError) -> Self {
        PushError::EncryptionError(err.to_string())
    }
}

pub struct WebPushClient {
    client: Client,
    signer: VapidSigner,
    ttl_secs: u32,
}

impl WebPushClient {
    pub fn new(client: Client, signer: VapidSigner, ttl_secs: u32) -> Self {
        Self {
            client,
            signer,
            ttl_secs,
        }
    }

    /// Builds a client from the `push` config section and a resolved key pair.
    pub fn from_config(
        client: Client,
        config: &PushConfig,
        keys: &VapidKeys,
    ) -> Result<Self, PushError> {
        let signer = VapidSigner::new(keys, &config.vapid_subject)?;
        Ok(Self::new(client, signer, config.ttl_secs))
    }

    pub fn public_key(&self) -> &str {
        self.signer.public_key()
    }

    /// Encrypts and delivers one payload to one subscription.
    ///
    /// # Errors
    ///
    /// * `PushError::Gone` for HTTP 404/410; the caller should forget the subscription
    /// * `PushError::ApiError` for any other non-2xx answer
    /// * `PushError::RequestError` when the push service cannot be reached
    pub async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<NotificationResult, PushError> {
        let body = serde_json::to_vec(payload)?;
        let info = SubscriptionInfo::new(
            subscription.endpoint.clone(),
            subscription.p256dh.clone(),
            subscription.auth.clone(),
        );

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &body);
        builder.set_ttl(self.ttl_secs);
        let message = builder.build()?;

        let authorization = self.signer.authorization(&subscription.endpoint, Utc::now())?;

        let mut request = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .header("Urgency", "high")
            .header(header::AUTHORIZATION, authorization);

        match message.payload {
            Some(encrypted) => {
                request = request
                    .header(header::CONTENT_ENCODING, "aes128gcm")
                    .header(header::CONTENT_TYPE, "application/octet-stream");
                for (name, value) in encrypted.crypto_headers {
                    request = request.header(name, value);
                }
                request = request.body(encrypted.content);
            }
            None => {
                request = request.header(header::CONTENT_LENGTH, "0");
            }
        }

        debug!("Sending push to subscription {}", subscription.id);
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            warn!(
                "Push subscription {} is gone (HTTP {})",
                subscription.id,
                status.as_u16()
            );
            return Err(PushError::Gone(status.as_u16()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PushError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let id = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| subscription.endpoint.clone());

        info!("Push delivered to subscription {}", subscription.id);
        Ok(NotificationResult {
            id,
            status: status.as_u16().to_string(),
        })
    }
}
