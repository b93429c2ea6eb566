//! VAPID (RFC 8292) application server identification.
//!
//! The key pair comes from the `push` config section when both halves are set
//! there, otherwise from the newest row of the `vapid_keys` table.

use chrono::{DateTime, Duration, Utc};
use dosewatch_config::PushConfig;
use dosewatch_db::VapidKeyRepository;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::PushError;
use crate::keys::{decode_private_key, decode_public_key, encode_url_safe, vapid_pkcs8_der};

/// Push services reject tokens valid for more than 24 hours.
const TOKEN_LIFETIME_HOURS: i64 = 12;

/// A validated VAPID key pair, both halves base64url without padding.
#[derive(Debug, Clone, PartialEq)]
pub struct VapidKeys {
    pub public_key: String,
    pub private_key: String,
}

impl VapidKeys {
    pub fn new(public_key: &str, private_key: &str) -> Result<Self, PushError> {
        let public = decode_public_key(public_key, "VAPID public key")?;
        let private = decode_private_key(private_key)?;
        Ok(Self {
            public_key: encode_url_safe(&public),
            private_key: encode_url_safe(&private),
        })
    }
}

/// Loads the VAPID key pair, preferring configuration over the database.
///
/// Returns `Ok(None)` when neither source has a pair.
pub async fn resolve_vapid_keys<R: VapidKeyRepository>(
    config: Option<&PushConfig>,
    repository: &R,
) -> Result<Option<VapidKeys>, PushError> {
    if let Some(push) = config {
        if let (Some(public), Some(private)) = (&push.vapid_public_key, &push.vapid_private_key) {
            info!("Using VAPID key pair from configuration");
            return VapidKeys::new(public, private).map(Some);
        }
    }

    match repository.latest().await? {
        Some(pair) => {
            info!("Using VAPID key pair {} from the database", pair.id);
            VapidKeys::new(&pair.public_key, &pair.private_key).map(Some)
        }
        None => Ok(None),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VapidClaims {
    pub aud: String,
    pub exp: i64,
    pub sub: String,
}

/// Signs per-origin ES256 tokens for the `Authorization: vapid` header.
#[derive(Clone)]
pub struct VapidSigner {
    public_key: String,
    subject: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for VapidSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapidSigner")
            .field("public_key", &self.public_key)
            .field("subject", &self.subject)
            .finish()
    }
}

impl VapidSigner {
    pub fn new(keys: &VapidKeys, subject: &str) -> Result<Self, PushError> {
        if subject.trim().is_empty() {
            return Err(PushError::ConfigError("push.vapid_subject is empty".into()));
        }
        let public = decode_public_key(&keys.public_key, "VAPID public key")?;
        let private = decode_private_key(&keys.private_key)?;
        let der = vapid_pkcs8_der(&private, &public);

        Ok(Self {
            public_key: keys.public_key.clone(),
            subject: subject.to_string(),
            encoding_key: EncodingKey::from_ec_der(&der),
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Builds the full `Authorization` header value for a push endpoint.
    pub fn authorization(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String, PushError> {
        let token = self.sign(endpoint, now)?;
        Ok(format!("vapid t={}, k={}", token, self.public_key))
    }

    /// Signs a token whose audience is the origin of `endpoint`.
    pub fn sign(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String, PushError> {
        let url = Url::parse(endpoint)
            .map_err(|e| PushError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        let aud = url.origin().ascii_serialization();
        debug!("Signing VAPID token for audience {}", aud);

        let claims = VapidClaims {
            aud,
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
            sub: self.subject.clone(),
        };
        let mut header = Header::new(Algorithm::ES256);
        header.typ = Some("JWT".to_string());

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    const PUBLIC_KEY: &str =
        "BFY37npj9sAQgxuWm23slhcLtrcVEoUw7PzAFpIqQ_mY5eWw9CG7PSASCNjaucXp51xNp_xsJiL7MwITLc7kHck";
    const PRIVATE_KEY: &str = "evjM6F6-jBTpGyJgye_T0rQVGjFeO1tCMZEnl60pIXY";

    fn signer() -> VapidSigner {
        let keys = VapidKeys::new(PUBLIC_KEY, PRIVATE_KEY).unwrap();
        VapidSigner::new(&keys, "mailto:support@dosewatch.app").unwrap()
    }

    #[test]
    fn test_token_verifies_against_public_key() {
        let now = Utc::now();
        let token = signer()
            .sign("https://fcm.googleapis.com/fcm/send/abc123", now)
            .unwrap();

        let public = decode_public_key(PUBLIC_KEY, "test").unwrap();
        let key = DecodingKey::from_ec_components(
            &encode_url_safe(&public[1..33]),
            &encode_url_safe(&public[33..65]),
        )
        .unwrap();
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&["https://fcm.googleapis.com"]);

        let data = decode::<VapidClaims>(&token, &key, &validation).unwrap();
        assert_eq!(data.claims.aud, "https://fcm.googleapis.com");
        assert_eq!(data.claims.sub, "mailto:support@dosewatch.app");
        assert_eq!(data.claims.exp, (now + Duration::hours(12)).timestamp());
    }

    #[test]
    fn test_authorization_header_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let header = signer()
            .authorization("http://127.0.0.1:8931/push/abc", now)
            .unwrap();
        assert!(header.starts_with("vapid t="));
        assert!(header.ends_with(&format!(", k={}", PUBLIC_KEY)));
    }

    #[test]
    fn test_rejects_bad_endpoint_and_subject() {
        assert!(matches!(
            signer().sign("not a url", Utc::now()),
            Err(PushError::InvalidEndpoint(_))
        ));
        let keys = VapidKeys::new(PUBLIC_KEY, PRIVATE_KEY).unwrap();
        assert!(VapidSigner::new(&keys, " ").is_err());
    }
}
