//! Rate limiting constants.

use std::time::Duration;

/// Margin added on top of the server's `retry_after` before requests resume.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5);

/// Status code the platform uses to reject a request for exceeding its budget.
pub const RATE_LIMITED_STATUS: u16 = 429;
