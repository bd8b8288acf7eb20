//! Outbound rate limiting.
//!
//! The platform enforces a global request budget and answers `429` with a
//! `retry_after` once it is exhausted. Every REST call waits on one shared
//! lockout deadline before it goes out.

pub mod constants;
pub mod limiter;
pub mod types;

pub use constants::*;
pub use limiter::*;
pub use types::*;
