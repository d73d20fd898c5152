//! Chat message entities.

pub mod model;
pub mod role;

pub use model::{CreateMessage, Message};
pub use role::MessageRole;
