//! Interaction dispatch.
//!
//! Verifies inbound webhook interactions, classifies them, and routes each
//! one to exactly one handler: a registered command, a permanent component
//! or modal handler, an armed wait, or a fallback.

pub mod client;
pub mod commands;
pub mod context;
pub mod error;
pub mod handler;
pub mod reply;
pub mod router;
pub mod signature;
pub mod wait_queue;

pub use client::{Client, ClientBuilder};
pub use commands::{Command, CommandPath, CommandRegistry, RegistryError, ResolvedCommand};
pub use context::{
    AutocompleteInteraction, CommandInteraction, ComponentInteraction, ModalInteraction,
};
pub use error::InteractionError;
pub use reply::InteractionReply;
pub use signature::{InteractionVerifier, SignatureError, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use wait_queue::{PendingWait, WaitOutcome, WaitQueue, WaitQueueError};
