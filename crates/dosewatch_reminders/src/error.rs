use dosewatch_common::DoseWatchError;
use dosewatch_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Bad or expired snooze-link signature
    #[error("{0}")]
    Unauthorized(String),

    /// The channel needed for the operation is not configured
    #[error("{0}")]
    Unavailable(String),
}

impl From<ReminderError> for DoseWatchError {
    fn from(err: ReminderError) -> Self {
        match err {
            ReminderError::Database(e) => e.into(),
            ReminderError::Validation(msg) => DoseWatchError::ValidationError(msg),
            ReminderError::NotFound(what) => DoseWatchError::NotFoundError(what),
            ReminderError::Unauthorized(msg) => DoseWatchError::AuthError(msg),
            ReminderError::Unavailable(msg) => DoseWatchError::UnavailableError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dosewatch_common::HttpStatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ReminderError::Validation("bad".into()), 400),
            (ReminderError::NotFound("Medication m1".into()), 404),
            (ReminderError::Unauthorized("expired".into()), 401),
            (ReminderError::Unavailable("push is off".into()), 503),
            (
                ReminderError::Database(DbError::QueryError("locked".into())),
                500,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(DoseWatchError::from(err).status_code(), status);
        }
    }
}
