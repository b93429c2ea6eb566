//! Twilio SMS integration for DoseWatch
//!
//! Sends plain-text reminders through the Twilio Messages API and exposes the
//! client as an [`SmsSender`](dosewatch_common::services::SmsSender).

/// Twilio error type and the `SmsSender` implementation.
pub mod service;
/// Messages API client.
pub mod twilio_sms;


pub use service::TwilioError;
pub use twilio_sms::{TwilioMessage, TwilioSmsClient};
