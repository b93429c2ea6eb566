// --- File: crates/dosewatch_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Domain records
pub mod notifications; // Per-channel payloads
pub mod services; // Channel sender abstractions

pub use error::{
    config_error, database_error, external_service_error, internal_error, not_found,
    unauthorized, unavailable, validation_error, Context, DoseWatchError, HttpStatusCode,
};

pub use http::{
    client::{create_client, shared_client, HTTP_CLIENT},
    handle_json_result, map_json_error, IntoHttpResponse,
};

pub use logging::{init, init_from_config, init_with_level, log_error, log_result, LoggingGuard};

pub use models::{
    new_id, ContactPreferences, DeliveryStatus, DueReminder, Medication, Profile,
    PushSubscription, ReminderChannel, ReminderHistory, VapidKeyPair,
};

pub use notifications::{EmailMessage, NotificationPayload, PushAction, PushPayload, SmsMessage};

pub use services::{
    BoxFuture, DeliveryError, EmailSender, NotificationResult, PushSender, ServiceFactory,
    SmsSender,
};

pub use features::is_feature_enabled;

#[cfg(feature = "push")]
pub use features::is_push_enabled;

#[cfg(feature = "email")]
pub use features::is_email_enabled;

#[cfg(feature = "twilio")]
pub use features::is_twilio_enabled;
