//! HTTP handlers for browser push registration
//!
//! The browser fetches the VAPID public key, subscribes through the Push API
//! and hands the resulting subscription to `POST /push/subscriptions`.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use dosewatch_common::models::{new_id, PushSubscription};
use dosewatch_common::{unavailable, validation_error, DoseWatchError};
use dosewatch_db::{PushSubscriptionRepository, SqlPushSubscriptionRepository};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::keys::normalize_subscription_keys;
use crate::models::{
    SubscribeRequest, SubscribeResponse, UnsubscribeRequest, UnsubscribeResponse,
    VapidPublicKeyResponse,
};

/// Shared state for the push registration handlers
#[derive(Clone)]
pub struct PushState {
    pub subscriptions: SqlPushSubscriptionRepository,
    /// `None` when no VAPID key pair is configured or stored
    pub vapid_public_key: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/push/vapid-public-key",
    responses(
        (status = 200, description = "VAPID application server key", body = VapidPublicKeyResponse),
        (status = 503, description = "No VAPID key pair configured")
    ),
    tag = "Push"
))]
pub async fn vapid_public_key_handler(State(state): State<Arc<PushState>>) -> Response {
    match &state.vapid_public_key {
        Some(key) => Json(VapidPublicKeyResponse {
            public_key: key.clone(),
        })
        .into_response(),
        None => {
            warn!("VAPID public key requested but no key pair is configured");
            unavailable("No VAPID key pair configured").into_response()
        }
    }
}

/// Stores a browser subscription, replacing keys and owner of an existing
/// row with the same endpoint.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/push/subscriptions",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription stored", body = SubscribeResponse),
        (status = 400, description = "Malformed endpoint or keys"),
        (status = 500, description = "Database error")
    ),
    tag = "Push"
))]
pub async fn subscribe_handler(
    State(state): State<Arc<PushState>>,
    Json(payload): Json<SubscribeRequest>,
) -> Response {
    debug!("Registering push subscription for user {}", payload.user_id);

    if payload.user_id.trim().is_empty() {
        return validation_error("userId must not be empty").into_response();
    }
    if !payload.endpoint.starts_with("https://") && !payload.endpoint.starts_with("http://") {
        return validation_error("endpoint must be an http(s) URL").into_response();
    }

    let (p256dh, auth) = match normalize_subscription_keys(&payload.keys.p256dh, &payload.keys.auth) {
        Ok(keys) => keys,
        Err(err) => {
            warn!("Rejected push subscription keys: {}", err);
            return validation_error(err).into_response();
        }
    };

    let subscription = PushSubscription {
        id: new_id(),
        user_id: payload.user_id,
        endpoint: payload.endpoint,
        p256dh,
        auth,
        created_at: Utc::now(),
    };

    match state.subscriptions.upsert(&subscription).await {
        Ok(stored) => {
            info!(
                "Stored push subscription {} for user {}",
                stored.id, stored.user_id
            );
            Json(SubscribeResponse {
                success: true,
                subscription_id: stored.id,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to store push subscription: {}", err);
            DoseWatchError::from(err).into_response()
        }
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/push/subscriptions",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Subscription removed (or already absent)", body = UnsubscribeResponse),
        (status = 500, description = "Database error")
    ),
    tag = "Push"
))]
pub async fn unsubscribe_handler(
    State(state): State<Arc<PushState>>,
    Json(payload): Json<UnsubscribeRequest>,
) -> Response {
    match state.subscriptions.delete_by_endpoint(&payload.endpoint).await {
        Ok(removed) => {
            if removed {
                info!("Removed push subscription {}", payload.endpoint);
            }
            (
                StatusCode::OK,
                Json(UnsubscribeResponse {
                    success: true,
                    removed,
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to remove push subscription: {}", err);
            DoseWatchError::from(err).into_response()
        }
    }
}
