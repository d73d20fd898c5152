//! # compliance-database
//!
//! PostgreSQL connection management, the embedded schema changes for the
//! processing-log and message tables, catalog inspection, and repository
//! implementations.

pub mod connection;
pub mod inspect;
pub mod migration;
pub mod repositories;
pub mod schema;

pub use connection::DatabasePool;
pub use schema::SchemaChange;
