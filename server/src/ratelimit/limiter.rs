//! Global lockout gate for outbound requests.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::DEFAULT_SAFETY_MARGIN;

/// Shared "locked until" deadline in front of every outbound request.
///
/// At most one lockout window is published at a time; every caller observes
/// the same deadline. The lock is never held across a sleep.
#[derive(Debug)]
pub struct GlobalRateLimiter {
    /// `None` when requests may flow freely.
    locked_until: RwLock<Option<Instant>>,
    /// Added to every server-provided `retry_after`.
    safety_margin: Duration,
}

impl Default for GlobalRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}

impl GlobalRateLimiter {
    /// Creates an unlocked limiter.
    pub fn new(safety_margin: Duration) -> Self {
        Self {
            locked_until: RwLock::new(None),
            safety_margin,
        }
    }

    /// The published deadline, if any.
    pub async fn locked_until(&self) -> Option<Instant> {
        *self.locked_until.read().await
    }

    /// Whether a lockout window is currently in effect.
    pub async fn is_locked(&self) -> bool {
        self.locked_until()
            .await
            .is_some_and(|deadline| deadline > Instant::now())
    }

    /// Blocks until the published deadline passes. Returns immediately when
    /// no lockout is in effect. Never modifies the deadline.
    ///
    /// The deadline is re-read after every sleep, so a window extended by a
    /// concurrent 429 keeps the caller waiting.
    pub async fn wait_if_locked(&self) {
        loop {
            let Some(deadline) = self.locked_until().await else {
                return;
            };

            let now = Instant::now();
            if deadline <= now {
                return;
            }

            debug!(
                wait_ms = (deadline - now).as_millis() as u64,
                "Outbound requests locked, waiting"
            );
            tokio::time::sleep_until(deadline).await;
        }
    }

    /// Publishes a lockout of `retry_after` plus the safety margin, waits it
    /// out, then clears it.
    ///
    /// When a later deadline is already published it is kept, so concurrent
    /// 429s never shorten an active window. Only the caller whose deadline is
    /// still published at wake-up clears it.
    pub async fn lockout(&self, retry_after: Duration) {
        let requested = Instant::now() + retry_after + self.safety_margin;

        let deadline = {
            let mut guard = self.locked_until.write().await;
            let deadline = match *guard {
                Some(existing) if existing >= requested => existing,
                _ => requested,
            };
            *guard = Some(deadline);
            deadline
        };

        warn!(
            retry_after_ms = retry_after.as_millis() as u64,
            margin_ms = self.safety_margin.as_millis() as u64,
            "Rate limited by remote server, locking outbound requests"
        );

        tokio::time::sleep_until(deadline).await;

        let mut guard = self.locked_until.write().await;
        if *guard == Some(deadline) {
            *guard = None;
            debug!("Outbound lockout cleared");
        }
    }
}
