//! Web Push delivery for DoseWatch
//!
//! This crate sends medication reminders to browsers through the Web Push
//! protocol and exposes the endpoints the browser uses to register itself.
//!
//! # Features
//!
//! - `aes128gcm` payload encryption (RFC 8291)
//! - VAPID application server identification with ES256 tokens (RFC 8292)
//! - VAPID key pair resolution from configuration or the `vapid_keys` table
//! - Subscription registration and removal over HTTP
//! - OpenAPI/Swagger documentation (with the `openapi` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use dosewatch_db::{DbClient, SqlPushSubscriptionRepository, SqlVapidKeyRepository};
//! use dosewatch_push::{resolve_vapid_keys, routes, PushState};
//! use std::sync::Arc;
//!
//! async fn setup_app(db: DbClient) -> Result<(), dosewatch_push::PushError> {
//!     let keys = resolve_vapid_keys(None, &SqlVapidKeyRepository::new(db.clone())).await?;
//!     let state = Arc::new(PushState {
//!         subscriptions: SqlPushSubscriptionRepository::new(db),
//!         vapid_public_key: keys.map(|k| k.public_key),
//!     });
//!     let app = routes(state);
//!     // Nest the router under /api in your Axum server
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /push/vapid-public-key` - application server key for `PushManager.subscribe`
//! - `POST /push/subscriptions` - store a browser subscription
//! - `DELETE /push/subscriptions` - remove a subscription by endpoint

pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod keys;
pub mod models;
pub mod routes;
pub mod service;
pub mod vapid;

pub use client::{PushError, WebPushClient};
pub use handlers::PushState;
pub use routes::routes;
pub use vapid::{resolve_vapid_keys, VapidKeys, VapidSigner};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::PushApiDoc;
}
