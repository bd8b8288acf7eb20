//! Wire types.

pub mod command;
pub mod interaction;
pub mod message;
pub mod response;
pub mod user;

pub use command::*;
pub use interaction::*;
pub use message::*;
pub use response::*;
pub use user::*;
