//! Catalog queries used to check what a schema change left behind.
//!
//! All lookups are scoped to `current_schema()`.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;

/// Shape of one column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// SQL data type, e.g. `character varying`.
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub is_nullable: bool,
    /// Declared length for character types.
    pub max_length: Option<i32>,
    /// Default expression, if any.
    pub default_expr: Option<String>,
}

/// Whether `table` exists in the current schema.
pub async fn table_exists(pool: &PgPool, table: &str) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = $1)",
    )
    .bind(table)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up table", e))
}

/// Describe `table.column`, or `None` when the column does not exist.
pub async fn column_info(pool: &PgPool, table: &str, column: &str) -> AppResult<Option<ColumnInfo>> {
    sqlx::query_as::<_, ColumnInfo>(
        "SELECT column_name::text AS name, \
                data_type::text AS data_type, \
                (is_nullable::text = 'YES') AS is_nullable, \
                character_maximum_length::int4 AS max_length, \
                column_default::text AS default_expr \
         FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up column", e))
}

/// Number of columns on `table` with the given name (0 or 1 in practice).
pub async fn count_columns(pool: &PgPool, table: &str, column: &str) -> AppResult<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
    )
    .bind(table)
    .bind(column)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count columns", e))
}

/// Names of every index on `table`, primary key included, sorted.
pub async fn index_names(pool: &PgPool, table: &str) -> AppResult<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT indexname::text FROM pg_indexes \
         WHERE schemaname = current_schema() AND tablename = $1 \
         ORDER BY indexname",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list indexes", e))
}

/// The `COMMENT ON COLUMN` text for `table.column`, if set.
pub async fn column_comment(pool: &PgPool, table: &str, column: &str) -> AppResult<Option<String>> {
    let comment = sqlx::query_scalar::<_, Option<String>>(
        "SELECT col_description(c.oid, a.attnum) \
         FROM pg_class c \
         JOIN pg_namespace n ON n.oid = c.relnamespace \
         JOIN pg_attribute a ON a.attrelid = c.oid \
         WHERE n.nspname = current_schema() AND c.relname = $1 AND a.attname = $2 \
           AND NOT a.attisdropped",
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read column comment", e))?;
    Ok(comment.flatten())
}
