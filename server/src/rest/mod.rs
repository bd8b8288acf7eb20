//! REST transport.
//!
//! Outbound calls to the platform API: every request passes the global
//! lockout gate, is retried a bounded number of times, and resolves into a
//! [`RestError`] taxonomy the handlers can act on.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;

pub use client::{RestClient, RetryPolicy};
pub use error::RestError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
