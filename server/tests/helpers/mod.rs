//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending signed interactions through the
//! full axum router, a recording REST transport, and `spawn_test_server` for
//! tests that need a real socket (for example a fake platform API).
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{self, Method, Request, Response};
use axum::Router;
use futures::future::BoxFuture;
use hookwire_server::api::{create_router, AppState};
use hookwire_server::config::Config;
use hookwire_server::interactions::{Client, ClientBuilder, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use hookwire_server::ratelimit::GlobalRateLimiter;
use hookwire_server::rest::{
    HttpRequest, HttpResponse, HttpTransport, RestClient, RetryPolicy, TransportError,
};
use http_body_util::BodyExt;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower::ServiceExt;

// ============================================================================
// Signing
// ============================================================================

/// Seed of the key pair the test platform signs with.
pub const SIGNING_SEED: [u8; 32] = [7; 32];

/// Timestamp used for every signed request.
pub const TIMESTAMP: &str = "1700000000";

pub fn signing_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed_unchecked(&SIGNING_SEED).expect("valid seed")
}

/// Hex-encoded public half of the test key.
pub fn public_key_hex() -> String {
    hex::encode(signing_key().public_key().as_ref())
}

/// Hex signature of `timestamp || body`.
pub fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).as_ref())
}

// ============================================================================
// Recording transport
// ============================================================================

/// REST transport that records every request and answers from a queue,
/// falling back to `200 {}` once the queue is empty.
#[derive(Default)]
pub struct RecordingTransport {
    replies: Mutex<VecDeque<HttpResponse>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply for the next request.
    pub fn push_reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(HttpResponse {
            status,
            body: Bytes::from(body.to_string()),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for RecordingTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| HttpResponse {
                status: 200,
                body: Bytes::from_static(b"{}"),
            });
        Box::pin(async move { Ok(reply) })
    }
}

/// A REST client for `config` over `transport`.
pub fn rest_client(config: &Config, transport: Arc<dyn HttpTransport>) -> RestClient {
    RestClient::new(
        config.bot_token.clone(),
        config.api_base_url.clone(),
        transport,
        Arc::new(GlobalRateLimiter::new(config.rate_limit_safety_margin())),
        RetryPolicy {
            max_attempts: config.rest_max_attempts,
            base_delay: config.rest_retry_base_delay(),
        },
    )
    .expect("valid test token")
}

/// Test configuration whose public key matches [`signing_key`].
pub fn test_config() -> Config {
    Config {
        public_key: public_key_hex(),
        ..Config::default_for_test()
    }
}

// ============================================================================
// TestApp
// ============================================================================

/// Test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub client: Arc<Client>,
    pub transport: Arc<RecordingTransport>,
}

impl TestApp {
    /// App with no handlers registered.
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// App whose client is configured by `configure`.
    pub fn with(configure: impl FnOnce(ClientBuilder) -> ClientBuilder) -> Self {
        let config = test_config();
        let transport = RecordingTransport::new();
        let rest = rest_client(&config, transport.clone());
        let builder = ClientBuilder::from_config(&config, rest).expect("valid test key");
        let client = configure(builder).build();
        let router = create_router(AppState::new(Arc::clone(&client)));

        Self {
            router,
            client,
            transport,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// A `POST /` carrying `body` with valid signature headers.
    pub fn signed(body: &[u8]) -> Request<Body> {
        Self::request(Method::POST, "/")
            .header(SIGNATURE_HEADER, sign(TIMESTAMP, body))
            .header(TIMESTAMP_HEADER, TIMESTAMP)
            .header("content-type", "application/json")
            .body(Body::from(body.to_vec()))
            .unwrap()
    }

    /// Send a request through the router.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    /// Sign and send an interaction envelope.
    pub async fn send_interaction(&self, interaction: &Value) -> Response<Body> {
        let body = serde_json::to_vec(interaction).unwrap();
        self.oneshot(Self::signed(&body)).await
    }
}

/// Interaction envelope of the given type. Guild interactions carry a
/// member; direct-message ones carry a user.
pub fn interaction(kind: u8, in_guild: bool, data: Value) -> Value {
    let mut envelope = json!({
        "id": "100",
        "application_id": "1",
        "type": kind,
        "token": "tok",
        "version": 1,
        "channel_id": "5",
        "data": data,
    });
    if in_guild {
        envelope["guild_id"] = json!("9");
        envelope["member"] = json!({"user": {"id": "42", "username": "ada"}, "roles": []});
    } else {
        envelope["user"] = json!({"id": "42", "username": "ada"});
    }
    envelope
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes()
}

/// Parse a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "Response is not JSON ({e}): {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

// ============================================================================
// Test servers
// ============================================================================

/// A running test server.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}
