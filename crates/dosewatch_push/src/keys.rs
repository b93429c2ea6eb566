//! Key encodings for Web Push.
//!
//! Browsers hand out subscription keys in either base64 alphabet, with or
//! without padding. Everything is stored as base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::client::PushError;

/// Uncompressed P-256 point: 0x04 || X || Y
pub const P256_PUBLIC_KEY_LEN: usize = 65;
pub const P256_PRIVATE_KEY_LEN: usize = 32;
pub const AUTH_SECRET_LEN: usize = 16;

// PKCS#8 v1 wrapper for an EC P-256 key: version, ecPublicKey/prime256v1
// algorithm identifier, then an ECPrivateKey with the public point attached.
const PKCS8_PREFIX: [u8; 36] = [
    0x30, 0x81, 0x87, 0x02, 0x01, 0x00, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d,
    0x02, 0x01, 0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x04, 0x6d, 0x30,
    0x6b, 0x02, 0x01, 0x01, 0x04, 0x20,
];
const PKCS8_PUBLIC_KEY_TAG: [u8; 5] = [0xa1, 0x44, 0x03, 0x42, 0x00];

/// Decode base64 in either alphabet, padded or not.
pub fn decode_flexible(value: &str) -> Result<Vec<u8>, PushError> {
    let normalized: String = value
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| PushError::KeyError(format!("invalid base64: {}", e)))
}

pub fn encode_url_safe(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Normalizes and validates a subscription's `p256dh` and `auth` keys.
pub fn normalize_subscription_keys(p256dh: &str, auth: &str) -> Result<(String, String), PushError> {
    let public = decode_public_key(p256dh, "p256dh")?;
    let secret = decode_flexible(auth)?;
    if secret.len() != AUTH_SECRET_LEN {
        return Err(PushError::KeyError(format!(
            "auth secret must be {} bytes, got {}",
            AUTH_SECRET_LEN,
            secret.len()
        )));
    }
    Ok((encode_url_safe(&public), encode_url_safe(&secret)))
}

pub fn decode_public_key(value: &str, what: &str) -> Result<Vec<u8>, PushError> {
    let bytes = decode_flexible(value)?;
    if bytes.len() != P256_PUBLIC_KEY_LEN || bytes[0] != 0x04 {
        return Err(PushError::KeyError(format!(
            "{} must be an uncompressed {}-byte P-256 point",
            what, P256_PUBLIC_KEY_LEN
        )));
    }
    Ok(bytes)
}

pub fn decode_private_key(value: &str) -> Result<Vec<u8>, PushError> {
    let bytes = decode_flexible(value)?;
    if bytes.len() != P256_PRIVATE_KEY_LEN {
        return Err(PushError::KeyError(format!(
            "VAPID private key must be {} bytes, got {}",
            P256_PRIVATE_KEY_LEN,
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Wraps a raw VAPID key pair into the PKCS#8 DER document the ES256 signer expects.
pub fn vapid_pkcs8_der(private_key: &[u8], public_key: &[u8]) -> Vec<u8> {
    let mut der = Vec::with_capacity(
        PKCS8_PREFIX.len() + private_key.len() + PKCS8_PUBLIC_KEY_TAG.len() + public_key.len(),
    );
    der.extend_from_slice(&PKCS8_PREFIX);
    der.extend_from_slice(private_key);
    der.extend_from_slice(&PKCS8_PUBLIC_KEY_TAG);
    der.extend_from_slice(public_key);
    der
}
