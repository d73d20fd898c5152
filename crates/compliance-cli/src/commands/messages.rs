//! Message maintenance commands.

use clap::{Args, Subcommand};

use crate::output;
use compliance_core::config::AppConfig;
use compliance_core::error::AppError;
use compliance_database::repositories::MessageRepository;

/// Arguments for message commands
#[derive(Debug, Args)]
pub struct MessagesArgs {
    /// Message subcommand
    #[command(subcommand)]
    pub command: MessagesCommand,
}

/// Message subcommands
#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// Copy each conversation's agent type onto its unattributed bot messages
    Backfill {
        /// Only report how many rows would change
        #[arg(long)]
        dry_run: bool,
    },
}

/// Execute message commands
pub async fn execute(args: &MessagesArgs, config: &AppConfig) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = MessageRepository::new(pool);

    match &args.command {
        MessagesCommand::Backfill { dry_run } => {
            let unattributed = repo.count_missing_agent_type().await?;
            let candidates = repo.count_backfill_candidates().await?;
            output::print_kv("Bot messages without agent", &unattributed.to_string());
            output::print_kv("Attributable now", &candidates.to_string());

            if *dry_run {
                return Ok(());
            }

            let changed = repo.backfill_agent_types().await?;
            output::print_success(&format!("Backfilled agent type on {changed} message(s)"));

            let remaining = repo.count_missing_agent_type().await?;
            if remaining > 0 {
                output::print_warning(&format!(
                    "{remaining} bot message(s) belong to conversations without an agent type"
                ));
            }
        }
    }

    Ok(())
}
