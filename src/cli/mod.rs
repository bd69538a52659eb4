pub mod commands;
pub mod config;
pub mod init;
pub mod status;
pub mod task;

pub use commands::*;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::Value;

use crate::config::Config;
use crate::db::{connection, SqliteStore};
use crate::engine::{FixedClock, Scheduler, TaskManager};
use crate::error::UpkeepError;
use crate::output;

/// Per-invocation settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub json: bool,
    pub today: NaiveDate,
}

pub type CliManager<'c> = TaskManager<SqliteStore<'c>, FixedClock>;

pub fn parse_date(s: &str, what: &str) -> Result<NaiveDate, UpkeepError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        UpkeepError::validation(format!(
            "Invalid {what} '{s}'. Use YYYY-MM-DD (e.g. 2025-03-15)"
        ))
    })
}

/// Build a lifecycle manager over `conn` with the configured scheduler options.
pub fn manager<'c>(conn: &'c Connection, ctx: &Context) -> Result<CliManager<'c>, UpkeepError> {
    let config = Config::load(&connection::config_path()?)?;
    Ok(TaskManager::new(SqliteStore::new(conn), FixedClock(ctx.today))
        .with_scheduler(Scheduler::new(config.scheduler_options())))
}

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: cannot encode output: {e}"),
    }
}

pub fn run(command: Commands, ctx: &Context) -> i32 {
    let result = match command {
        Commands::Init => init::run(ctx),
        Commands::Add {
            title,
            due,
            schedule,
            season,
            notes,
            list,
        } => task::run_add(&title, &due, &schedule, &season, notes, list, ctx),
        Commands::List {
            status,
            advisory,
            list,
            before,
            all,
        } => task::run_list(status.as_deref(), advisory.as_deref(), list, before.as_deref(), all, ctx),
        Commands::Show { reference } => task::run_show(&reference, ctx),
        Commands::Done { reference, on } => task::run_done(&reference, on.as_deref(), ctx),
        Commands::Snooze { reference, until } => task::run_snooze(&reference, &until, ctx),
        Commands::Unsnooze { reference } => task::run_unsnooze(&reference, ctx),
        Commands::Edit {
            reference,
            title,
            notes,
            list,
            once,
            schedule,
            season,
            any_month,
        } => task::run_edit(
            &reference,
            task::EditArgs {
                title,
                notes,
                list,
                once,
                schedule,
                season,
                any_month,
            },
            ctx,
        ),
        Commands::Delete { reference } => task::run_delete(&reference, ctx),
        Commands::Preview { reference, on } => task::run_preview(&reference, on.as_deref(), ctx),
        Commands::Status => status::run_status(ctx),
        Commands::Refresh => status::run_refresh(ctx),
        Commands::Config(cmd) => config::run(cmd, ctx),
    };
    finish(result, ctx.json)
}

/// Report a command's outcome and turn it into an exit code.
pub fn finish(result: Result<i32, UpkeepError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(code = e.code.as_str(), "command failed: {}", e.message);
            if json_output {
                print_json(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}
