//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod message;

pub use validation::ValidationError;
pub use message::{MessageContent, MessageId, Nickname, DEFAULT_NICKNAME};
