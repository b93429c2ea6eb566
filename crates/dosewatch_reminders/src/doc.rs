use utoipa::OpenApi;

use dosewatch_common::models::{DeliveryStatus, Medication, Profile, ReminderChannel, ReminderHistory};

use crate::catalog::{CreateMedicationRequest, ProfileRequest, UpdateMedicationRequest};
use crate::dispatcher::DispatchReport;
use crate::handlers::DispatchResponse;
use crate::notify::{PushSendReport, PushSendRequest};
use crate::snooze::{SnoozeRequest, SnoozeResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::dispatch_handler,
        crate::handlers::snooze_handler,
        crate::handlers::snooze_link_handler,
        crate::handlers::push_send_handler,
        crate::handlers::history_handler,
        crate::handlers::create_medication_handler,
        crate::handlers::list_medications_handler,
        crate::handlers::get_medication_handler,
        crate::handlers::update_medication_handler,
        crate::handlers::delete_medication_handler,
        crate::handlers::get_profile_handler,
        crate::handlers::upsert_profile_handler,
    ),
    components(
        schemas(
            DispatchResponse,
            DispatchReport,
            SnoozeRequest,
            SnoozeResponse,
            PushSendRequest,
            PushSendReport,
            ReminderHistory,
            ReminderChannel,
            DeliveryStatus,
            Medication,
            CreateMedicationRequest,
            UpdateMedicationRequest,
            Profile,
            ProfileRequest,
        )
    ),
    tags(
        (name = "Reminders", description = "Dispatch cycles, snoozing and delivery history"),
        (name = "Medications", description = "Medication schedules"),
        (name = "Profiles", description = "Contact details and channel preferences")
    ),
    servers(
        (url = "/api", description = "DoseWatch API server")
    )
)]
pub struct ReminderApiDoc;
