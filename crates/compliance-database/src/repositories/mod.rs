//! Repository implementations for the compliance tables.

pub mod conversation;
pub mod message;
pub mod processing_log;

pub use conversation::ConversationRepository;
pub use message::MessageRepository;
pub use processing_log::{ProcessingLogFilter, ProcessingLogRepository};
