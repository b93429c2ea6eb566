//! Signed snooze links for SMS reminders.
//!
//! A link carries the medication id, the snooze length and an expiry; the
//! signature is hex HMAC-SHA256 over `"{medication_id}:{hours}:{expires}"`.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::error::ReminderError;

type HmacSha256 = Hmac<Sha256>;

/// Query string of `GET /reminders/snooze-link`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SnoozeLinkQuery {
    pub medication_id: String,
    pub hours: u32,
    /// Unix timestamp (seconds) after which the link is refused
    pub expires: i64,
    pub signature: String,
}

#[derive(Clone)]
pub struct SnoozeLinkSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for SnoozeLinkSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnoozeLinkSigner")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SnoozeLinkSigner {
    /// `base_url` is the public origin the API is served from, without `/api`.
    pub fn new(secret: &str, base_url: &str) -> Result<Self, ReminderError> {
        if secret.is_empty() {
            return Err(ReminderError::Validation(
                "reminders.link_secret must not be empty".into(),
            ));
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn mac(&self, medication_id: &str, hours: u32, expires: i64) -> Result<HmacSha256, ReminderError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| ReminderError::Validation("invalid link secret".into()))?;
        mac.update(format!("{}:{}:{}", medication_id, hours, expires).as_bytes());
        Ok(mac)
    }

    pub fn sign(&self, medication_id: &str, hours: u32, expires: i64) -> Result<String, ReminderError> {
        let mac = self.mac(medication_id, hours, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Builds the full link for snoozing `medication_id` by `hours`.
    pub fn link(
        &self,
        medication_id: &str,
        hours: u32,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, ReminderError> {
        let expires = (now + ttl).timestamp();
        let query = SnoozeLinkQuery {
            medication_id: medication_id.to_string(),
            hours,
            expires,
            signature: self.sign(medication_id, hours, expires)?,
        };
        let encoded = serde_urlencoded::to_string(&query)
            .map_err(|e| ReminderError::Validation(format!("cannot encode snooze link: {}", e)))?;
        Ok(format!("{}/api/reminders/snooze-link?{}", self.base_url, encoded))
    }

    /// Checks signature and expiry of an incoming link.
    pub fn verify(&self, query: &SnoozeLinkQuery, now: DateTime<Utc>) -> Result<(), ReminderError> {
        let provided = hex::decode(&query.signature).map_err(|_| {
            warn!("Snooze link for {} has a malformed signature", query.medication_id);
            ReminderError::Unauthorized("invalid snooze link signature".into())
        })?;

        self.mac(&query.medication_id, query.hours, query.expires)?
            .verify_slice(&provided)
            .map_err(|_| {
                warn!("Snooze link for {} failed verification", query.medication_id);
                ReminderError::Unauthorized("invalid snooze link signature".into())
            })?;

        if now.timestamp() > query.expires {
            debug!("Snooze link for {} expired at {}", query.medication_id, query.expires);
            return Err(ReminderError::Unauthorized("snooze link has expired".into()));
        }
        Ok(())
    }
}
