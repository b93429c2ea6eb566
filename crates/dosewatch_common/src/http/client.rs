// --- File: crates/dosewatch_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;
use tracing::warn;

/// Default timeout for outbound provider requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared client for provider calls (push services, email API, Twilio).
///
/// Falls back to reqwest's defaults if the TLS backend cannot be configured.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    create_client(DEFAULT_TIMEOUT_SECS, true).unwrap_or_else(|e| {
        warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
        Client::new()
    })
});

/// Creates a new HTTP client with the given timeout and redirect policy.
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}

/// Returns a handle to the shared client. Cloning a reqwest client shares its pool.
pub fn shared_client() -> Client {
    HTTP_CLIENT.clone()
}
