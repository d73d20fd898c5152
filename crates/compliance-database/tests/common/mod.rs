//! Shared helpers for database integration tests.
//!
//! Tests run against the PostgreSQL server at `DATABASE_URL`, which must be
//! set. Each test gets its own throw-away schema.

#![allow(dead_code)]

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use compliance_core::config::DatabaseConfig;
use compliance_database::DatabasePool;
use compliance_database::migration::run_migrations;

/// An isolated schema on the test database.
pub struct TestDb {
    /// Pool whose `search_path` is the test schema.
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    /// Create an empty schema.
    pub async fn empty() -> Self {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must point at a PostgreSQL server for integration tests");

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");

        let schema = format!("compliance_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");

        let config = DatabaseConfig::with_url(url).in_schema(schema.clone());
        let pool = DatabasePool::connect(&config)
            .await
            .expect("Failed to connect test pool")
            .into_pool();

        Self {
            pool,
            admin,
            schema,
        }
    }

    /// Create a schema with every migration applied.
    pub async fn migrated() -> Self {
        let db = Self::empty().await;
        run_migrations(&db.pool)
            .await
            .expect("Failed to run migrations");
        db
    }

    /// Drop the schema and close both pools.
    pub async fn cleanup(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("Failed to drop test schema");
        self.admin.close().await;
    }
}
