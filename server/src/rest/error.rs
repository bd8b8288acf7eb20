//! REST error types.

use std::time::Duration;

use thiserror::Error;

use super::transport::TransportError;

/// Errors returned by outbound REST calls.
#[derive(Debug, Error)]
pub enum RestError {
    /// The configured token lacks the mandatory `Bot ` prefix.
    #[error("App token needs to start with \"Bot \" prefix (example: \"Bot XYZABCQEWQ\")")]
    InvalidToken,

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The request payload could not be encoded as JSON.
    #[error("Failed to serialize request payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The request never produced a usable response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error status.
    #[error("Remote server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The server rejected the request for exceeding its rate limit.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Every attempt failed.
    #[error("Failed to make HTTP request {attempts} times to {method} :: {route}: {source}")]
    Exhausted {
        method: String,
        route: String,
        attempts: u32,
        source: Box<RestError>,
    },
}

impl RestError {
    /// HTTP status carried by the error, looking through exhaustion.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}
