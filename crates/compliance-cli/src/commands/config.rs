//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use compliance_core::config::AppConfig;
use compliance_core::error::AppError;
use compliance_database::DatabasePool;
use compliance_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (password masked)
    Show,
    /// Validate configuration and test the database connection
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            output::print_item(&shown, format);
        }
        ConfigCommand::Validate => {
            output::print_kv("Config file", config_path);
            output::print_kv("Database", &mask_password(&config.database.url));
            output::print_kv("Logging", &format!("{} ({})", config.logging.level, config.logging.format));

            match DatabasePool::connect(&config.database).await {
                Ok(pool) => {
                    let schema = pool.current_schema().await?;
                    pool.close().await;
                    output::print_kv("Schema", &schema);
                    output::print_success("Configuration is valid and the database is reachable");
                }
                Err(e) => {
                    output::print_error(&format!("Database unreachable: {}", e));
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
