//! Schema change commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use compliance_core::config::AppConfig;
use compliance_core::error::AppError;
use compliance_database::schema;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations through the sqlx migrator
    Run,
    /// List the embedded schema changes
    List,
    /// Re-apply one schema change directly (safe to repeat)
    Apply {
        /// Unit name or version, e.g. `processing-log`
        unit: String,
    },
    /// Check that every schema object the changes create is present
    Verify,
}

/// Schema change display row
#[derive(Debug, Serialize, Tabled)]
struct UnitRow {
    /// Version
    version: i64,
    /// Name
    name: &'static str,
    /// Description
    description: &'static str,
}

/// Verification display row
#[derive(Debug, Serialize, Tabled)]
struct VerifyRow {
    /// Unit name
    unit: &'static str,
    /// OK or MISSING
    status: &'static str,
    /// Missing objects
    missing: String,
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if let MigrateCommand::List = &args.command {
        let rows: Vec<UnitRow> = schema::all()
            .iter()
            .map(|unit| UnitRow {
                version: unit.version,
                name: unit.name,
                description: unit.description,
            })
            .collect();
        output::print_list(&rows, format);
        return Ok(());
    }

    let pool = super::create_db_pool(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            compliance_database::migration::run_migrations(&pool).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::List => {}
        MigrateCommand::Apply { unit } => {
            let change = schema::find(unit).ok_or_else(|| {
                let known: Vec<&str> = schema::all().iter().map(|u| u.name).collect();
                AppError::not_found(format!(
                    "Unknown schema change '{}'. Known: {}",
                    unit,
                    known.join(", ")
                ))
            })?;

            let rows = change.apply(&pool).await?;
            output::print_success(&format!(
                "Applied '{}' ({} rows affected)",
                change.name, rows
            ));
        }
        MigrateCommand::Verify => {
            let mut rows = Vec::new();
            for unit in schema::all() {
                let missing = unit.verify(&pool).await?;
                rows.push(VerifyRow {
                    unit: unit.name,
                    status: if missing.is_empty() { "OK" } else { "MISSING" },
                    missing: missing
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            output::print_list(&rows, format);

            let incomplete = rows.iter().filter(|r| !r.missing.is_empty()).count();
            if incomplete > 0 {
                return Err(AppError::validation(format!(
                    "{incomplete} schema change(s) incomplete"
                )));
            }
            output::print_success("Schema is complete.");
        }
    }

    Ok(())
}
