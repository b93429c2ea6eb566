use utoipa::OpenApi;

use crate::models::{
    SubscribeRequest, SubscribeResponse, SubscriptionKeys, UnsubscribeRequest,
    UnsubscribeResponse, VapidPublicKeyResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::vapid_public_key_handler,
        crate::handlers::subscribe_handler,
        crate::handlers::unsubscribe_handler,
    ),
    components(
        schemas(
            SubscribeRequest,
            SubscriptionKeys,
            SubscribeResponse,
            UnsubscribeRequest,
            UnsubscribeResponse,
            VapidPublicKeyResponse,
        )
    ),
    tags(
        (name = "Push", description = "Browser push subscription registration")
    ),
    servers(
        (url = "/api", description = "DoseWatch API server")
    )
)]
pub struct PushApiDoc;
