//! GDPR processing log CLI commands.

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use compliance_core::config::AppConfig;
use compliance_core::error::AppError;
use compliance_core::types::pagination::PageRequest;
use compliance_database::repositories::{ProcessingLogFilter, ProcessingLogRepository};
use compliance_entity::processing_log::{ActivityType, CreateDataProcessingLog, LegalBasis};

/// Arguments for processing log commands
#[derive(Debug, Args)]
pub struct ProcessingLogArgs {
    /// Processing log subcommand
    #[command(subcommand)]
    pub command: ProcessingLogCommand,
}

/// Processing log subcommands
#[derive(Debug, Subcommand)]
pub enum ProcessingLogCommand {
    /// Search the processing log, newest first
    Search {
        /// Filter by data subject
        #[arg(short, long)]
        user: Option<i32>,
        /// Filter by activity type
        #[arg(short, long)]
        activity: Option<String>,
        /// Filter by acting administrator
        #[arg(long)]
        performed_by: Option<i32>,
        /// Only entries from the last N days
        #[arg(short, long)]
        days: Option<i64>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
    /// Export every entry about one data subject to a JSON file
    Export {
        /// Data subject
        #[arg(short, long)]
        user: i32,
        /// Output file path
        #[arg(short, long, default_value = "processing_log_export.json")]
        output: String,
    },
    /// Append one entry
    Record {
        /// Data subject
        #[arg(short, long)]
        user: i32,
        /// Activity type, e.g. `data_access`
        #[arg(short, long)]
        activity: String,
        /// HTTP method
        #[arg(long)]
        method: Option<String>,
        /// Request endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Stated purpose
        #[arg(long)]
        purpose: Option<String>,
        /// Data category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Legal basis
        #[arg(long)]
        legal_basis: Option<LegalBasis>,
        /// Administrator acting on the subject's behalf
        #[arg(long)]
        performed_by: Option<i32>,
    },
}

/// Processing log display row
#[derive(Debug, Serialize, Tabled)]
struct LogRow {
    /// ID
    id: i32,
    /// Time
    time: String,
    /// Subject
    user: i32,
    /// Activity
    activity: String,
    /// Request
    request: String,
    /// Legal basis
    basis: String,
    /// Performed by
    by: String,
}

/// Start of a `--days` window ending at `now`.
fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AppError> {
    if days < 0 {
        return Err(AppError::validation(format!(
            "--days must not be negative, got {days}"
        )));
    }
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| AppError::validation(format!("--days {days} is out of range")))
}

/// Execute processing log commands
pub async fn execute(
    args: &ProcessingLogArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = ProcessingLogRepository::new(pool);

    match &args.command {
        ProcessingLogCommand::Search {
            user,
            activity,
            performed_by,
            days,
            page,
            limit,
        } => {
            let filter = ProcessingLogFilter {
                user_id: *user,
                activity_type: activity.as_deref().map(ActivityType::from),
                performed_by_user_id: *performed_by,
                since: days.map(|d| window_start(Utc::now(), d)).transpose()?,
                until: None,
            };

            let response = repo
                .search(&filter, &PageRequest::new(*page, *limit))
                .await?;

            let rows: Vec<LogRow> = response
                .items
                .iter()
                .map(|e| LogRow {
                    id: e.id,
                    time: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    user: e.user_id,
                    activity: e.activity_type.clone(),
                    request: match (&e.method, &e.endpoint) {
                        (Some(m), Some(p)) => format!("{m} {p}"),
                        (None, Some(p)) => p.clone(),
                        _ => String::new(),
                    },
                    basis: e.legal_basis.clone().unwrap_or_default(),
                    by: e
                        .performed_by_user_id
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                })
                .collect();

            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} entries)",
                    response.page, response.total_pages, response.total_items
                );
            }
        }
        ProcessingLogCommand::Export {
            user,
            output: out_path,
        } => {
            let entries = repo.find_for_user(*user).await?;
            let json = serde_json::to_string_pretty(&entries)?;
            tokio::fs::write(out_path, json).await?;

            output::print_success(&format!(
                "Exported {} processing log entries for user {} to '{}'",
                entries.len(),
                user,
                out_path
            ));
        }
        ProcessingLogCommand::Record {
            user,
            activity,
            method,
            endpoint,
            purpose,
            categories,
            legal_basis,
            performed_by,
        } => {
            let mut entry = CreateDataProcessingLog::new(*user, activity.as_str());
            entry.method = method.as_ref().map(|m| m.to_uppercase());
            entry.endpoint = endpoint.clone();
            entry.purpose = purpose.clone();
            entry.data_categories = categories.clone();
            entry.legal_basis = *legal_basis;
            entry.performed_by_user_id = *performed_by;

            let recorded = repo.record(&entry).await?;
            if !recorded.activity().is_known() {
                output::print_warning(&format!(
                    "'{}' is not a standard activity type",
                    recorded.activity_type
                ));
            }
            output::print_item(&recorded, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_core::error::ErrorKind;

    #[test]
    fn test_window_start_counts_back_whole_days() {
        let now = Utc::now();
        assert_eq!(window_start(now, 0).unwrap(), now);
        assert_eq!(window_start(now, 7).unwrap(), now - Duration::days(7));
    }

    #[test]
    fn test_window_start_rejects_out_of_range_days() {
        let now = Utc::now();
        for days in [-1, 100_000_000, i64::MAX] {
            let err = window_start(now, days).unwrap_err();
            assert!(err.is(ErrorKind::Validation), "days = {days}");
        }
    }
}
