// File: crates/dosewatch_reminders/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use dosewatch_common::models::{Medication, Profile, ReminderHistory};
use dosewatch_common::{map_json_error, DoseWatchError};
use dosewatch_db::{HistoryFilter, ReminderHistoryRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::{
    create_medication, delete_medication, get_medication, get_profile, list_medications,
    update_medication, upsert_profile, CreateMedicationRequest, ProfileRequest,
    UpdateMedicationRequest,
};
use crate::context::ReminderContext;
use crate::dispatcher::{run_dispatch_cycle, DispatchReport};
use crate::error::ReminderError;
use crate::links::SnoozeLinkQuery;
use crate::notify::{send_push_to_user, PushSendReport, PushSendRequest};
use crate::snooze::{snooze, snooze_from_link, SnoozeRequest, SnoozeResponse};

type SharedContext = Arc<ReminderContext>;

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: DispatchReport,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct HistoryQuery {
    pub medication_id: Option<String>,
    pub user_id: Option<String>,
    /// Defaults to 100, capped at 1000
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct MedicationListQuery {
    pub user_id: String,
}

/// Runs one dispatch cycle. Meant for external schedulers; takes no body.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/reminders/dispatch",
    responses(
        (status = 200, description = "Cycle finished", body = DispatchResponse),
        (status = 500, description = "Database error, cycle aborted")
    ),
    tag = "Reminders"
))]
pub async fn dispatch_handler(
    State(ctx): State<SharedContext>,
) -> Result<Json<DispatchResponse>, Response> {
    let result = run_dispatch_cycle(&ctx).await.map(|report| DispatchResponse {
        success: true,
        report,
    });
    if let Err(err) = &result {
        error!("Dispatch cycle failed: {}", err);
    }
    map_json_error(result, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/reminders/snooze",
    request_body = SnoozeRequest,
    responses(
        (status = 200, description = "Reminder snoozed", body = SnoozeResponse),
        (status = 400, description = "Invalid duration"),
        (status = 404, description = "Unknown medication"),
        (status = 500, description = "Database error")
    ),
    tag = "Reminders"
))]
pub async fn snooze_handler(
    State(ctx): State<SharedContext>,
    Json(request): Json<SnoozeRequest>,
) -> Result<Json<SnoozeResponse>, Response> {
    info!(
        "Snooze requested for medication {} ({}h)",
        request.medication_id, request.duration
    );
    map_json_error(
        snooze(&ctx, &request.medication_id, request.duration).await,
        DoseWatchError::from,
    )
}

/// Sends one notification to every push subscription of a user.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/push/send",
    request_body = PushSendRequest,
    responses(
        (status = 200, description = "Sent to every subscription; per-device failures counted", body = PushSendReport),
        (status = 400, description = "Missing user or oversized payload"),
        (status = 503, description = "Push is not configured"),
        (status = 500, description = "Database error")
    ),
    tag = "Push"
))]
pub async fn push_send_handler(
    State(ctx): State<SharedContext>,
    Json(request): Json<PushSendRequest>,
) -> Result<Json<PushSendReport>, Response> {
    map_json_error(send_push_to_user(&ctx, &request).await, DoseWatchError::from)
}

/// Target of the links appended to SMS reminders.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/reminders/snooze-link",
    params(SnoozeLinkQuery),
    responses(
        (status = 200, description = "Reminder snoozed", body = SnoozeResponse),
        (status = 401, description = "Invalid or expired link"),
        (status = 404, description = "Unknown medication")
    ),
    tag = "Reminders"
))]
pub async fn snooze_link_handler(
    State(ctx): State<SharedContext>,
    Query(query): Query<SnoozeLinkQuery>,
) -> Result<Json<SnoozeResponse>, Response> {
    map_json_error(snooze_from_link(&ctx, &query).await, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/reminders/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History rows, newest first", body = [ReminderHistory]),
        (status = 500, description = "Database error")
    ),
    tag = "Reminders"
))]
pub async fn history_handler(
    State(ctx): State<SharedContext>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ReminderHistory>>, Response> {
    let filter = HistoryFilter {
        medication_id: query.medication_id,
        user_id: query.user_id,
        limit: query.limit,
    };
    map_json_error(
        ctx.history.list(&filter).await.map_err(ReminderError::from),
        DoseWatchError::from,
    )
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = Medication),
        (status = 400, description = "Invalid fields or unparseable frequency")
    ),
    tag = "Medications"
))]
pub async fn create_medication_handler(
    State(ctx): State<SharedContext>,
    Json(request): Json<CreateMedicationRequest>,
) -> Response {
    match create_medication(&ctx, request).await {
        Ok(medication) => (StatusCode::CREATED, Json(medication)).into_response(),
        Err(err) => DoseWatchError::from(err).into_response(),
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/medications",
    params(MedicationListQuery),
    responses((status = 200, description = "Medications of the user", body = [Medication])),
    tag = "Medications"
))]
pub async fn list_medications_handler(
    State(ctx): State<SharedContext>,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<Vec<Medication>>, Response> {
    map_json_error(list_medications(&ctx, &query.user_id).await, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/medications/{id}",
    params(("id" = String, Path, description = "Medication id")),
    responses(
        (status = 200, description = "The medication", body = Medication),
        (status = 404, description = "Unknown medication")
    ),
    tag = "Medications"
))]
pub async fn get_medication_handler(
    State(ctx): State<SharedContext>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, Response> {
    map_json_error(get_medication(&ctx, &id).await, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/medications/{id}",
    params(("id" = String, Path, description = "Medication id")),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Updated medication", body = Medication),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Unknown medication")
    ),
    tag = "Medications"
))]
pub async fn update_medication_handler(
    State(ctx): State<SharedContext>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMedicationRequest>,
) -> Result<Json<Medication>, Response> {
    map_json_error(update_medication(&ctx, &id, request).await, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/medications/{id}",
    params(("id" = String, Path, description = "Medication id")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 404, description = "Unknown medication")
    ),
    tag = "Medications"
))]
pub async fn delete_medication_handler(
    State(ctx): State<SharedContext>,
    Path(id): Path<String>,
) -> Response {
    match delete_medication(&ctx, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => DoseWatchError::from(err).into_response(),
    }
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/profiles/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The profile", body = Profile),
        (status = 404, description = "No profile for this user")
    ),
    tag = "Profiles"
))]
pub async fn get_profile_handler(
    State(ctx): State<SharedContext>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, Response> {
    map_json_error(get_profile(&ctx, &id).await, DoseWatchError::from)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/profiles/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Stored profile", body = Profile),
        (status = 400, description = "Invalid email address")
    ),
    tag = "Profiles"
))]
pub async fn upsert_profile_handler(
    State(ctx): State<SharedContext>,
    Path(id): Path<String>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<Profile>, Response> {
    map_json_error(upsert_profile(&ctx, &id, request).await, DoseWatchError::from)
}
