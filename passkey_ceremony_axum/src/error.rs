use axum::{Json, extract::rejection::JsonRejection};
use http::StatusCode;
use serde_json::{Value, json};

use passkey_ceremony::CeremonyError;

/// Error half of every ceremony handler's return type
pub type ErrorResponse = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, message: &str) -> ErrorResponse {
    (status, Json(json!({ "error": message })))
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

/// Maps each ceremony failure to a status code and a stable message.
/// Store and cache detail is logged here and never returned to the client.
impl<T> IntoResponseError<T> for Result<T, CeremonyError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            let (status, message) = match &e {
                CeremonyError::InputValidation(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
                CeremonyError::UserNotFound(_) => (StatusCode::NOT_FOUND, "User not found"),
                CeremonyError::SessionNotFound(_) => {
                    (StatusCode::NOT_FOUND, "Session not found or expired")
                }
                CeremonyError::Decode(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to decode stored credential",
                ),
                CeremonyError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
                CeremonyError::Cache(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access session data",
                ),
                CeremonyError::Verification(_) => (StatusCode::BAD_REQUEST, "Verification failed"),
                CeremonyError::Config(_) | CeremonyError::Unexpected(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            };
            if status.is_server_error() {
                tracing::error!("Ceremony failed: {}", e);
            } else {
                tracing::debug!("Ceremony rejected: {}", e);
            }
            error_body(status, message)
        })
    }
}

/// Body extraction failures all surface as the same 400
impl<T> IntoResponseError<T> for Result<T, JsonRejection> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e.body_text());
            error_body(StatusCode::BAD_REQUEST, "Invalid JSON")
        })
    }
}
