use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{subscribe_handler, unsubscribe_handler, vapid_public_key_handler, PushState};

/// Push registration routes, mounted under `/api` by the backend.
///
/// The caller resolves the VAPID key pair and builds the subscription
/// repository; schema creation happens at application startup.
pub fn routes(state: Arc<PushState>) -> Router {
    info!(
        "Push routes initialized (VAPID key {})",
        if state.vapid_public_key.is_some() {
            "available"
        } else {
            "missing"
        }
    );

    Router::new()
        .route("/push/vapid-public-key", get(vapid_public_key_handler))
        .route(
            "/push/subscriptions",
            post(subscribe_handler).delete(unsubscribe_handler),
        )
        .with_state(state)
}
