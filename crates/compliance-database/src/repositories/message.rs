//! Message repository implementation.

use sqlx::PgPool;
use tracing::info;

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;
use compliance_entity::message::{CreateMessage, Message};

/// Copies a conversation's agent type onto its bot messages that have none.
///
/// Conversations without an agent type are skipped, so once applied a
/// re-run touches zero rows.
pub const BACKFILL_AGENT_TYPE_SQL: &str = "\
UPDATE fastapi_messages AS m
SET agent_type = c.agent_type
FROM fastapi_conversations AS c
WHERE m.conversation_id = c.id
  AND m.role = 'bot'
  AND m.agent_type IS NULL
  AND c.agent_type IS NOT NULL";

/// Repository for chat messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message.
    pub async fn create(&self, data: &CreateMessage) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO fastapi_messages (conversation_id, role, content, agent_type) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.conversation_id)
        .bind(data.role.as_str())
        .bind(&data.content)
        .bind(&data.agent_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM fastapi_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// All messages of a conversation, oldest first.
    pub async fn list_for_conversation(&self, conversation_id: i32) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM fastapi_messages WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))
    }

    /// Number of bot messages lacking an agent type.
    pub async fn count_missing_agent_type(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fastapi_messages WHERE role = 'bot' AND agent_type IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count unattributed messages", e)
        })
    }

    /// Number of rows the backfill would change right now.
    pub async fn count_backfill_candidates(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fastapi_messages AS m \
             JOIN fastapi_conversations AS c ON m.conversation_id = c.id \
             WHERE m.role = 'bot' AND m.agent_type IS NULL AND c.agent_type IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count backfill candidates", e)
        })
    }

    /// Run the agent-type backfill and return the number of rows changed.
    pub async fn backfill_agent_types(&self) -> AppResult<u64> {
        let result = sqlx::query(BACKFILL_AGENT_TYPE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to backfill message agent types", e)
            })?;

        info!(rows_affected = result.rows_affected(), "Backfilled message agent types");
        Ok(result.rows_affected())
    }
}
