// --- File: crates/dosewatch_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type surfaced by DoseWatch HTTP handlers.
///
/// Crate-specific errors (`DbError`, `ReminderError`, provider errors) convert
/// into this type at the HTTP boundary.
#[derive(Error, Debug)]
pub enum DoseWatchError {
    /// Error occurred during an outbound HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing or invalid credentials, including bad snooze-link signatures
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during an external provider call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    /// A required capability (e.g. a VAPID key pair) is not set up
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for DoseWatchError {
    fn status_code(&self) -> u16 {
        match self {
            DoseWatchError::HttpError(_) => 500,
            DoseWatchError::ParseError(_) => 400,
            DoseWatchError::ConfigError(_) => 500,
            DoseWatchError::AuthError(_) => 401,
            DoseWatchError::ValidationError(_) => 400,
            DoseWatchError::DatabaseError(_) => 500,
            DoseWatchError::ExternalServiceError { .. } => 502,
            DoseWatchError::ConflictError(_) => 409,
            DoseWatchError::NotFoundError(_) => 404,
            DoseWatchError::UnavailableError(_) => 503,
            DoseWatchError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, DoseWatchError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, DoseWatchError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, DoseWatchError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| DoseWatchError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, DoseWatchError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| DoseWatchError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<reqwest::Error> for DoseWatchError {
    fn from(err: reqwest::Error) -> Self {
        DoseWatchError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for DoseWatchError {
    fn from(err: serde_json::Error) -> Self {
        DoseWatchError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for DoseWatchError {
    fn from(err: std::io::Error) -> Self {
        DoseWatchError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::NotFoundError(message.to_string())
}

pub fn unauthorized<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::AuthError(message.to_string())
}

pub fn unavailable<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::UnavailableError(message.to_string())
}

pub fn database_error<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::DatabaseError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> DoseWatchError {
    DoseWatchError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> DoseWatchError {
    DoseWatchError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("bad duration").status_code(), 400);
        assert_eq!(unauthorized("bad signature").status_code(), 401);
        assert_eq!(not_found("medication").status_code(), 404);
        assert_eq!(unavailable("no vapid keys").status_code(), 503);
        assert_eq!(database_error("locked").status_code(), 500);
        assert_eq!(external_service_error("twilio", "down").status_code(), 502);
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let err = result.context("writing log").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: writing log: disk full");
    }
}
