//! Conversation repository implementation.

use sqlx::PgPool;

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;
use compliance_entity::conversation::{Conversation, CreateConversation};

/// Repository for conversations.
#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    /// Create a new conversation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a conversation.
    pub async fn create(&self, data: &CreateConversation) -> AppResult<Conversation> {
        sqlx::query_as::<_, Conversation>(
            "INSERT INTO fastapi_conversations (user_id, title, agent_type) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.title)
        .bind(&data.agent_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create conversation", e))
    }

    /// Find a conversation by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM fastapi_conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find conversation", e)
            })
    }

    /// Hand the conversation to another agent.
    ///
    /// Existing messages keep whatever `agent_type` they already carry.
    pub async fn set_agent_type(&self, id: i32, agent_type: Option<&str>) -> AppResult<Conversation> {
        sqlx::query_as::<_, Conversation>(
            "UPDATE fastapi_conversations SET agent_type = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(agent_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update conversation agent", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Conversation {id} not found")))
    }
}
