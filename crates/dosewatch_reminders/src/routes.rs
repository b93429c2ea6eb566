// --- File: crates/dosewatch_reminders/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::context::ReminderContext;
use crate::handlers::{
    create_medication_handler, delete_medication_handler, dispatch_handler,
    get_medication_handler, get_profile_handler, history_handler, list_medications_handler,
    push_send_handler, snooze_handler, snooze_link_handler, update_medication_handler,
    upsert_profile_handler,
};

/// Reminder, medication, profile and on-demand push routes, relative to `/api`.
pub fn routes(ctx: Arc<ReminderContext>) -> Router {
    Router::new()
        .route("/reminders/dispatch", post(dispatch_handler))
        .route("/reminders/snooze", post(snooze_handler))
        .route("/reminders/snooze-link", get(snooze_link_handler))
        .route("/reminders/history", get(history_handler))
        .route("/push/send", post(push_send_handler))
        .route(
            "/medications",
            get(list_medications_handler).post(create_medication_handler),
        )
        .route(
            "/medications/{id}",
            get(get_medication_handler)
                .put(update_medication_handler)
                .delete(delete_medication_handler),
        )
        .route(
            "/profiles/{id}",
            get(get_profile_handler).put(upsert_profile_handler),
        )
        .with_state(ctx)
}
