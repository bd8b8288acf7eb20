//! Rate-limit-aware REST client.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};
use super::RestError;
use crate::config::Config;
use crate::ratelimit::{GlobalRateLimiter, RateLimitedBody, RATE_LIMITED_STATUS};

/// Required prefix of the bot token.
pub const TOKEN_PREFIX: &str = "Bot ";

/// Serialized form of an unset component list.
const NULL_COMPONENTS: &str = r#""components":null"#;

/// What the API expects instead: an explicit empty list clears components.
const EMPTY_COMPONENTS: &str = r#""components":[]"#;

/// `User-Agent` sent with every request.
pub fn user_agent() -> String {
    format!(
        "DiscordBot ({}, {})",
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Bounded retry policy with linearly increasing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; attempt `n` waits `n` times this.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Outcome of a single attempt.
enum Attempt {
    /// Stop retrying and hand this result to the caller.
    Finished(Result<Bytes, RestError>),
    /// Try again if the budget allows.
    Retry(RestError),
}

/// REST client shared by every handler.
pub struct RestClient {
    token: String,
    base_url: String,
    user_agent: String,
    transport: Arc<dyn HttpTransport>,
    limiter: Arc<GlobalRateLimiter>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Creates a client. Fails when the token lacks the `Bot ` prefix.
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        limiter: Arc<GlobalRateLimiter>,
        policy: RetryPolicy,
    ) -> Result<Self, RestError> {
        let token = token.into();
        if !token.starts_with(TOKEN_PREFIX) {
            return Err(RestError::InvalidToken);
        }

        Ok(Self {
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent(),
            transport,
            limiter,
            policy,
        })
    }

    /// Creates a `reqwest`-backed client from server configuration.
    pub fn from_config(config: &Config) -> Result<Self, RestError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.rest_timeout_secs))?;
        Self::new(
            config.bot_token.clone(),
            config.api_base_url.clone(),
            Arc::new(transport),
            Arc::new(GlobalRateLimiter::new(config.rate_limit_safety_margin())),
            RetryPolicy {
                max_attempts: config.rest_max_attempts,
                base_delay: config.rest_retry_base_delay(),
            },
        )
    }

    /// The shared lockout gate.
    pub const fn limiter(&self) -> &Arc<GlobalRateLimiter> {
        &self.limiter
    }

    /// The retry policy in effect.
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Issues a request without a body.
    pub async fn request_empty(&self, method: Method, route: &str) -> Result<Bytes, RestError> {
        self.request::<()>(method, route, None).await
    }

    /// Issues a request, retrying up to the policy's attempt budget.
    ///
    /// Returns the raw response body; `204 No Content` yields an empty body.
    #[tracing::instrument(skip(self, method, payload), fields(method = %method))]
    pub async fn request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        route: &str,
        payload: Option<&P>,
    ) -> Result<Bytes, RestError> {
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(RestError::Serialization)?
            .map(|json| json.replace(NULL_COMPONENTS, EMPTY_COMPONENTS));

        let url = format!("{}{}", self.base_url, route);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            self.limiter.wait_if_locked().await;

            match self.attempt(&method, &url, body.clone()).await {
                Attempt::Finished(result) => return result,
                Attempt::Retry(err) => {
                    warn!(attempt, max_attempts, error = %err, "REST attempt failed");
                    last_error = Some(err);
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay_after(attempt)).await;
            }
        }

        Err(RestError::Exhausted {
            method: method.to_string(),
            route: route.to_string(),
            attempts: max_attempts,
            source: Box::new(last_error.unwrap_or(RestError::Transport(TransportError::Send(
                "no attempt was made".into(),
            )))),
        })
    }

    /// Sends once and classifies the outcome.
    async fn attempt(&self, method: &Method, url: &str, body: Option<String>) -> Attempt {
        let request = HttpRequest {
            method: method.clone(),
            url: url.to_string(),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("User-Agent", self.user_agent.clone()),
                ("Authorization", self.token.clone()),
            ],
            body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err @ TransportError::Send(_)) => return Attempt::Retry(err.into()),
            Err(err @ TransportError::Body(_)) => return Attempt::Finished(Err(err.into())),
        };

        match response.status {
            204 => Attempt::Finished(Ok(Bytes::new())),
            RATE_LIMITED_STATUS => {
                let info = RateLimitedBody::parse(&response.body);
                let retry_after = info.retry_after();
                debug!(global = info.global, message = %info.message, "Received 429");
                self.limiter.lockout(retry_after).await;
                Attempt::Retry(RestError::RateLimited { retry_after })
            }
            status if status >= 400 => Attempt::Finished(Err(RestError::Status {
                status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            })),
            _ => Attempt::Finished(Ok(response.body)),
        }
    }
}
