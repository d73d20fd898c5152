//! CLI command definitions and dispatch.

pub mod config;
pub mod messages;
pub mod migrate;
pub mod processing_log;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use crate::output::OutputFormat;
use compliance_core::config::AppConfig;
use compliance_core::error::AppError;
use compliance_database::DatabasePool;

/// Compliance schema tool: GDPR processing log and message attribution
#[derive(Debug, Parser)]
#[command(name = "compliance", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply and verify schema changes
    Migrate(migrate::MigrateArgs),
    /// GDPR data-processing log
    ProcessingLog(processing_log::ProcessingLogArgs),
    /// Message maintenance
    Messages(messages::MessagesArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app_config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, app_config, self.format).await,
            Commands::ProcessingLog(args) => {
                processing_log::execute(args, app_config, self.format).await
            }
            Commands::Messages(args) => messages::execute(args, app_config).await,
            Commands::Config(args) => {
                config::execute(args, app_config, &self.config, self.format).await
            }
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
