//! Conversation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A chat conversation between a user and an agent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Conversation identifier.
    pub id: i32,
    /// Owning user.
    pub user_id: i32,
    /// Display title.
    pub title: Option<String>,
    /// The agent currently handling the conversation.
    pub agent_type: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change time.
    pub updated_at: DateTime<Utc>,
}

/// Data required to open a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversation {
    /// Owning user.
    pub user_id: i32,
    /// Display title.
    pub title: Option<String>,
    /// Initial agent.
    pub agent_type: Option<String>,
}
