//! PostgreSQL connection pool management.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use compliance_core::config::DatabaseConfig;
use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// When `config.schema` is set, every connection starts with that
    /// schema as its `search_path`, so unqualified table names in the
    /// migrations and repositories resolve there.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            schema = config.schema.as_deref().unwrap_or("<default>"),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let mut options = PgConnectOptions::from_str(&config.url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid database URL", e)
        })?;
        if let Some(schema) = config.schema.as_deref() {
            options = options.options([("search_path", schema)]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Successfully connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Return the underlying sqlx pool (consuming self).
    pub fn into_pool(self) -> PgPool {
        self.pool
    }

    /// Name of the schema unqualified tables resolve to.
    pub async fn current_schema(&self) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT current_schema()::text")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read current schema", e)
            })
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
pub fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    // The last `@` ends the userinfo; an unencoded password may contain more.
    let Some(at_pos) = url[scheme_end..].rfind('@').map(|p| p + scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at_pos].find(':') {
        Some(colon) => {
            let colon_pos = scheme_end + colon;
            format!("{}:****{}", &url[..colon_pos], &url[at_pos..])
        }
        None => url.to_string(),
    }
}
