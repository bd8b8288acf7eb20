//! Hookwire Common Library
//!
//! Wire types exchanged with the chat platform: interaction envelopes,
//! command options, responses, and the handful of REST objects the server
//! reads back.

pub mod error;
pub mod snowflake;
pub mod types;

pub use error::{Error, Result};
pub use snowflake::Snowflake;
pub use types::*;
