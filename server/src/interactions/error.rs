//! Inbound interaction errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the platform as HTTP error statuses.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// Signature headers missing or not matching the body.
    #[error("Unauthorized")]
    Unauthorized,

    /// The body is not a valid interaction envelope.
    #[error("Malformed interaction payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Interactions are only delivered with `POST`.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

impl InteractionError {
    const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
        }
    }
}

impl IntoResponse for InteractionError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();
        let body = ErrorResponse {
            error,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            InteractionError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );

        let parse_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert_eq!(
            InteractionError::from(parse_err).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InteractionError::MethodNotAllowed.into_response().status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
