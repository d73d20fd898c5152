//! The schema changes shipped in `migrations/`, as applicable units.
//!
//! Each unit embeds the same SQL file the sqlx migrator runs. Every
//! statement in a unit is guarded (`IF NOT EXISTS`) or convergent, so a
//! unit can be re-applied directly against a database at any time.

use std::fmt;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;

use crate::inspect;

/// Schema objects a unit guarantees once applied.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedObjects {
    /// Tables that must exist.
    pub tables: &'static [&'static str],
    /// `(table, column)` pairs that must exist.
    pub columns: &'static [(&'static str, &'static str)],
    /// `(table, index)` pairs that must exist.
    pub indexes: &'static [(&'static str, &'static str)],
}

/// A schema object that is absent after a unit should have created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingObject {
    /// A table.
    Table { table: String },
    /// A column on a table.
    Column { table: String, column: String },
    /// An index on a table.
    Index { table: String, index: String },
}

impl fmt::Display for MissingObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { table } => write!(f, "table {table}"),
            Self::Column { table, column } => write!(f, "column {table}.{column}"),
            Self::Index { table, index } => write!(f, "index {index} on {table}"),
        }
    }
}

/// One idempotent schema change.
#[derive(Debug, Clone, Copy)]
pub struct SchemaChange {
    /// Migration version (the numeric prefix of the SQL file name).
    pub version: i64,
    /// Short name used on the command line.
    pub name: &'static str,
    /// Human-readable summary.
    pub description: &'static str,
    /// Full SQL script.
    pub sql: &'static str,
    /// Objects present after a successful apply.
    pub expected: ExpectedObjects,
}

/// Baseline conversation and message tables.
pub const CHAT_BASELINE: SchemaChange = SchemaChange {
    version: 20240101000000,
    name: "chat-baseline",
    description: "create conversation and message tables",
    sql: include_str!("../../../migrations/20240101000000_create_conversations_and_messages.sql"),
    expected: ExpectedObjects {
        tables: &["fastapi_conversations", "fastapi_messages"],
        columns: &[
            ("fastapi_conversations", "agent_type"),
            ("fastapi_messages", "conversation_id"),
            ("fastapi_messages", "role"),
        ],
        indexes: &[("fastapi_messages", "idx_fastapi_messages_conversation_id")],
    },
};

/// GDPR processing-log table with its three secondary indexes.
pub const PROCESSING_LOG_TABLE: SchemaChange = SchemaChange {
    version: 20240201000000,
    name: "processing-log",
    description: "create fastapi_data_processing_logs",
    sql: include_str!("../../../migrations/20240201000000_create_data_processing_logs.sql"),
    expected: ExpectedObjects {
        tables: &["fastapi_data_processing_logs"],
        columns: &[
            ("fastapi_data_processing_logs", "user_id"),
            ("fastapi_data_processing_logs", "activity_type"),
            ("fastapi_data_processing_logs", "legal_basis"),
            ("fastapi_data_processing_logs", "timestamp"),
            ("fastapi_data_processing_logs", "performed_by_user_id"),
        ],
        indexes: &[
            (
                "fastapi_data_processing_logs",
                "idx_fastapi_data_processing_logs_user_id",
            ),
            (
                "fastapi_data_processing_logs",
                "idx_fastapi_data_processing_logs_activity_type",
            ),
            (
                "fastapi_data_processing_logs",
                "idx_fastapi_data_processing_logs_timestamp",
            ),
        ],
    },
};

/// `agent_type` on messages, its index, and the bot-message backfill.
pub const MESSAGE_AGENT_TYPE: SchemaChange = SchemaChange {
    version: 20240202000000,
    name: "message-agent-type",
    description: "add fastapi_messages.agent_type and backfill bot messages",
    sql: include_str!("../../../migrations/20240202000000_add_agent_type_to_messages.sql"),
    expected: ExpectedObjects {
        tables: &["fastapi_messages"],
        columns: &[("fastapi_messages", "agent_type")],
        indexes: &[("fastapi_messages", "idx_fastapi_messages_agent_type")],
    },
};

static ALL: [SchemaChange; 3] = [CHAT_BASELINE, PROCESSING_LOG_TABLE, MESSAGE_AGENT_TYPE];

/// Every unit, in application order.
pub fn all() -> &'static [SchemaChange] {
    &ALL
}

/// Look a unit up by name or by version.
pub fn find(key: &str) -> Option<&'static SchemaChange> {
    ALL.iter()
        .find(|unit| unit.name == key || unit.version.to_string() == key)
}

impl SchemaChange {
    /// Execute the unit's script against `pool`.
    ///
    /// Returns the total rows affected across the script's statements.
    /// A statement rejected by the store aborts the script and the error is
    /// returned as-is in the `source` of a `Database` error.
    pub async fn apply(&self, pool: &PgPool) -> AppResult<u64> {
        info!(unit = self.name, version = self.version, "Applying schema change");

        let result = sqlx::raw_sql(self.sql).execute(pool).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Schema change '{}' failed: {e}", self.name),
                e,
            )
        })?;

        info!(
            unit = self.name,
            rows_affected = result.rows_affected(),
            "Schema change applied"
        );
        Ok(result.rows_affected())
    }

    /// List every expected object that is missing from the database.
    pub async fn verify(&self, pool: &PgPool) -> AppResult<Vec<MissingObject>> {
        let mut missing = Vec::new();

        for table in self.expected.tables {
            if !inspect::table_exists(pool, table).await? {
                missing.push(MissingObject::Table {
                    table: table.to_string(),
                });
            }
        }

        for (table, column) in self.expected.columns {
            if inspect::column_info(pool, table, column).await?.is_none() {
                missing.push(MissingObject::Column {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }

        for (table, index) in self.expected.indexes {
            let present = inspect::index_names(pool, table).await?;
            if !present.iter().any(|name| name == index) {
                missing.push(MissingObject::Index {
                    table: table.to_string(),
                    index: index.to_string(),
                });
            }
        }

        if missing.is_empty() {
            debug!(unit = self.name, "Schema change verified");
        } else {
            warn!(unit = self.name, missing = missing.len(), "Schema change incomplete");
        }
        Ok(missing)
    }

    /// The individual statements of the script, comments stripped.
    pub fn statements(&self) -> Vec<String> {
        let without_comments: String = self
            .sql
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");

        without_comments
            .split(';')
            .map(|stmt| stmt.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|stmt| !stmt.is_empty())
            .collect()
    }
}
