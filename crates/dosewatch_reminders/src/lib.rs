//! The DoseWatch reminder workflow
//!
//! Selects medications whose reminder is due, claims them, sends every enabled
//! channel, records one history row per attempt, and moves the next reminder
//! forward by the medication's interval. Snoozing (by API call or by a signed
//! SMS link) moves it forward by a chosen number of hours instead.
//!
//! All operations take a [`ReminderContext`], which owns the repositories,
//! the channel senders and the clock.
//!
//! # API Endpoints
//!
//! - `POST /reminders/dispatch` - run one dispatch cycle
//! - `POST /reminders/snooze` - snooze a medication's reminder
//! - `GET /reminders/snooze-link` - snooze through a signed link
//! - `GET /reminders/history` - delivery history
//! - `POST /push/send` - push one notification to all of a user's devices
//! - `GET|POST /medications`, `GET|PUT|DELETE /medications/{id}`
//! - `GET|PUT /profiles/{id}`

pub mod catalog;
pub mod clock;
pub mod context;
pub mod dispatcher;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod handlers;
pub mod interval;
#[cfg(test)]
mod interval_proptest;
pub mod job;
pub mod links;
pub mod notify;
pub mod rescheduler;
pub mod routes;
pub mod selector;
pub mod snooze;
pub mod templates;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ReminderContext, ReminderSettings};
pub use dispatcher::{run_dispatch_cycle, DispatchReport};
pub use error::ReminderError;
pub use job::spawn_scheduler;
pub use links::SnoozeLinkSigner;
pub use notify::{send_push_to_user, PushSendReport, PushSendRequest};
pub use routes::routes;
pub use snooze::{snooze, snooze_from_link, SnoozeResponse};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::ReminderApiDoc;
}
