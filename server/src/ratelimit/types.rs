//! Rate limiting types.

use std::time::Duration;

use serde::Deserialize;

/// Body of a `429 Too Many Requests` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RateLimitedBody {
    /// Whether the global budget (rather than a route bucket) was exhausted.
    #[serde(default)]
    pub global: bool,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Seconds to wait before retrying (fractional).
    #[serde(default)]
    pub retry_after: f64,
}

impl RateLimitedBody {
    /// Parse a 429 body. Unparseable bodies yield a zero wait; the safety
    /// margin still applies.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// `retry_after` as a duration. Negative, NaN or out-of-range values
    /// become zero.
    pub fn retry_after(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_after).unwrap_or_default()
    }
}
