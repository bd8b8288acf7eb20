//! Common error type.

use thiserror::Error;

/// Errors raised while handling wire types.
#[derive(Debug, Error)]
pub enum Error {
    /// A snowflake id was not a decimal `u64`.
    #[error("Invalid snowflake: {0}")]
    InvalidSnowflake(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
