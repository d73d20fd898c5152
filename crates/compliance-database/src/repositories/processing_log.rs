//! Data-processing log repository implementation.
//!
//! The log is append-only: this repository has no update or delete path.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;
use compliance_core::types::pagination::{PageRequest, PageResponse};
use compliance_entity::processing_log::{ActivityType, CreateDataProcessingLog, DataProcessingLog};

/// Optional filters for [`ProcessingLogRepository::search`].
#[derive(Debug, Clone, Default)]
pub struct ProcessingLogFilter {
    /// Only entries about this data subject.
    pub user_id: Option<i32>,
    /// Only entries of this activity.
    pub activity_type: Option<ActivityType>,
    /// Only entries performed by this administrator.
    pub performed_by_user_id: Option<i32>,
    /// Only entries recorded at or after this time.
    pub since: Option<DateTime<Utc>>,
    /// Only entries recorded before this time.
    pub until: Option<DateTime<Utc>>,
}

/// Repository for GDPR processing log entries.
#[derive(Debug, Clone)]
pub struct ProcessingLogRepository {
    pool: PgPool,
}

impl ProcessingLogRepository {
    /// Create a new processing log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry. The timestamp is assigned by the database.
    pub async fn record(&self, data: &CreateDataProcessingLog) -> AppResult<DataProcessingLog> {
        data.check()?;
        let data_categories = data.data_categories_json()?;

        let entry = sqlx::query_as::<_, DataProcessingLog>(
            "INSERT INTO fastapi_data_processing_logs \
             (user_id, activity_type, endpoint, method, ip_address, user_agent, purpose, \
              data_categories, legal_basis, performed_by_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.activity_type.as_str())
        .bind(&data.endpoint)
        .bind(&data.method)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.purpose)
        .bind(data_categories)
        .bind(data.legal_basis.map(|b| b.as_str()))
        .bind(data.performed_by_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record processing log entry", e)
        })?;

        debug!(
            id = entry.id,
            user_id = entry.user_id,
            activity_type = %entry.activity_type,
            "Recorded processing log entry"
        );
        Ok(entry)
    }

    /// Find an entry by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<DataProcessingLog>> {
        sqlx::query_as::<_, DataProcessingLog>(
            "SELECT * FROM fastapi_data_processing_logs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find processing log entry", e)
        })
    }

    /// Search the log, newest first.
    pub async fn search(
        &self,
        filter: &ProcessingLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DataProcessingLog>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.user_id.is_some() {
            conditions.push(format!("user_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.activity_type.is_some() {
            conditions.push(format!("activity_type = ${param_idx}"));
            param_idx += 1;
        }
        if filter.performed_by_user_id.is_some() {
            conditions.push(format!("performed_by_user_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.since.is_some() {
            conditions.push(format!("\"timestamp\" >= ${param_idx}"));
            param_idx += 1;
        }
        if filter.until.is_some() {
            conditions.push(format!("\"timestamp\" < ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM fastapi_data_processing_logs {where_clause}");
        let select_sql = format!(
            "SELECT * FROM fastapi_data_processing_logs {where_clause} \
             ORDER BY \"timestamp\" DESC, id DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, DataProcessingLog>(&select_sql);

        if let Some(uid) = filter.user_id {
            count_query = count_query.bind(uid);
            select_query = select_query.bind(uid);
        }
        if let Some(activity) = &filter.activity_type {
            count_query = count_query.bind(activity.as_str().to_string());
            select_query = select_query.bind(activity.as_str().to_string());
        }
        if let Some(actor) = filter.performed_by_user_id {
            count_query = count_query.bind(actor);
            select_query = select_query.bind(actor);
        }
        if let Some(since) = filter.since {
            count_query = count_query.bind(since);
            select_query = select_query.bind(since);
        }
        if let Some(until) = filter.until {
            count_query = count_query.bind(until);
            select_query = select_query.bind(until);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count processing log entries", e)
        })?;

        let entries = select_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search processing log", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    /// Every entry about one data subject, oldest first.
    pub async fn find_for_user(&self, user_id: i32) -> AppResult<Vec<DataProcessingLog>> {
        sqlx::query_as::<_, DataProcessingLog>(
            "SELECT * FROM fastapi_data_processing_logs WHERE user_id = $1 \
             ORDER BY \"timestamp\" ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to load processing log for user",
                e,
            )
        })
    }

    /// Count entries recorded since a specific time.
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fastapi_data_processing_logs WHERE \"timestamp\" >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to count recent processing log entries",
                e,
            )
        })
    }
}
