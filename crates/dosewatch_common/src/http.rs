// --- File: crates/dosewatch_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{DoseWatchError, HttpStatusCode};

pub mod client;

/// Extension trait for DoseWatchError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for DoseWatchError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for DoseWatchError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a `Result<T, DoseWatchError>` into a JSON response or an error response.
pub fn handle_json_result<T>(result: Result<T, DoseWatchError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Like [`handle_json_result`], mapping a domain error through `f` first.
pub fn map_json_error<T, E, F>(result: Result<T, E>, f: F) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
    F: FnOnce(E) -> DoseWatchError,
{
    result.map(Json).map_err(|err| f(err).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::not_found;

    #[test]
    fn test_error_response_status() {
        let response = not_found("Medication abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_map_json_error_uses_mapper() {
        let result: Result<u8, &str> = Err("locked");
        let response = map_json_error(result, |e| DoseWatchError::DatabaseError(e.into()))
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
