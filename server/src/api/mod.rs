//! API Router and Application State
//!
//! The interaction endpoint and a liveness probe.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::interactions::{Client, InteractionError, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Interaction client with every handler table
    pub client: Arc<Client>,
}

impl AppState {
    #[must_use]
    pub const fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(handle_interaction).fallback(method_not_allowed),
        )
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Verifies, parses and dispatches one interaction.
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, InteractionError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if !state
        .client
        .verify(header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER), &body)
    {
        warn!("Rejected interaction with invalid signature");
        return Err(InteractionError::Unauthorized);
    }

    match state.client.dispatch(&body).await {
        Ok(reply) => Ok(reply.into_response()),
        Err(e) => {
            error!(error = %e, "Failed to parse interaction");
            Err(e)
        }
    }
}

async fn method_not_allowed() -> InteractionError {
    InteractionError::MethodNotAllowed
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
