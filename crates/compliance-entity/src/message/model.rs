//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use compliance_core::result::AppResult;

use super::role::MessageRole;

/// A single message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Message identifier.
    pub id: i32,
    /// Owning conversation.
    pub conversation_id: i32,
    /// Author role as stored (`"user"` or `"bot"`).
    pub role: String,
    /// Message body.
    pub content: String,
    /// The agent that produced the message, if recorded.
    pub agent_type: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Typed author role.
    pub fn author(&self) -> AppResult<MessageRole> {
        self.role.parse()
    }
}

/// Data required to append a message.
///
/// `agent_type` is independent of the conversation's own agent type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessage {
    /// Owning conversation.
    pub conversation_id: i32,
    /// Author role.
    pub role: MessageRole,
    /// Message body.
    pub content: String,
    /// Producing agent.
    pub agent_type: Option<String>,
}
