//! CLI probe for the news filing core.
//!
//! # Responsibility
//! - Verify `newsdesk_core` linkage.
//! - Re-run filing or re-sorting against a database file by hand.

use clap::{Parser, Subcommand};
use newsdesk_core::db::open_db;
use newsdesk_core::{
    init_logging, LogNotifier, ReSorter, SortController, SortOutcome, SqliteNodeRepository,
    SqliteSettingsRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "newsdesk", version, about = "Date-folder filing for news items")]
struct Cli {
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with `--log-dir`.
    #[arg(long, global = true, default_value = newsdesk_core::default_log_level())]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core version and a health check.
    Ping,
    /// File one news item below its date folder.
    Refile {
        #[arg(long)]
        db: PathBuf,
        item: Uuid,
    },
    /// Re-sort the date folders below the given folders.
    Resort {
        #[arg(long)]
        db: PathBuf,
        #[arg(required = true)]
        folders: Vec<Uuid>,
    },
    /// Show or change the filing granularity.
    Settings {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        sort_by_month: Option<bool>,
        #[arg(long)]
        sort_by_day: Option<bool>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Ping => {
            println!("newsdesk_core ping={}", newsdesk_core::ping());
            println!("newsdesk_core version={}", newsdesk_core::core_version());
        }
        Command::Refile { db, item } => {
            let conn = open_db(db)?;
            let controller = SortController::new(
                SqliteNodeRepository::try_new(&conn)?,
                SqliteSettingsRepository::try_new(&conn)?,
                LogNotifier,
            );
            match controller.on_write_by_id(item)? {
                SortOutcome::Skipped(reason) => println!("skipped reason={reason:?}"),
                SortOutcome::Filed(filed) => println!(
                    "filed item={} target={} moved={} created={} resorted={}",
                    filed.item,
                    filed.target,
                    filed.moved(),
                    filed.created.len(),
                    filed.resort.updated
                ),
            }
        }
        Command::Resort { db, folders } => {
            let conn = open_db(db)?;
            let repo = SqliteNodeRepository::try_new(&conn)?;
            let report = ReSorter::new(&repo).resort(&folders)?;
            println!(
                "resorted folders={} updated={}",
                report.folders, report.updated
            );
        }
        Command::Settings {
            db,
            sort_by_month,
            sort_by_day,
        } => {
            let conn = open_db(db)?;
            let settings = SqliteSettingsRepository::try_new(&conn)?;
            let mut config = settings.load()?;
            if sort_by_month.is_some() || sort_by_day.is_some() {
                config.sort_by_month = sort_by_month.unwrap_or(config.sort_by_month);
                config.sort_by_day = sort_by_day.unwrap_or(config.sort_by_day);
                settings.save(&config)?;
            }
            println!(
                "sort_by_month={} sort_by_day={}",
                config.sort_by_month, config.sort_by_day
            );
        }
    }
    Ok(())
}
