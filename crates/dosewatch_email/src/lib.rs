//! Email delivery for DoseWatch
//!
//! Talks to a Resend-compatible HTTP API (`POST /emails` with a bearer key)
//! and exposes the client as an
//! [`EmailSender`](dosewatch_common::services::EmailSender).

pub mod client;
pub mod service;

pub use client::{EmailClient, EmailError};
