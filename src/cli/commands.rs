use clap::{Args, Parser, Subcommand};

const VERSION: &str = env!("UPKEEP_VERSION");

#[derive(Parser)]
#[command(
    name = "upkeep",
    version = VERSION,
    about = "Household upkeep task scheduler",
    after_help = "\
NOTE:
  Data lives in the nearest .upkeep/ directory (or $UPKEEP_DIR).
  Run `upkeep init` before any other command.
  Dates are YYYY-MM-DD. Tasks may be referenced by ID, ID prefix, or part of the title.

RECURRENCE:
  --every 4w|10d|1m|1y   Repeat interval (days, weeks, months, years).
  --anchor completion     Next due = completion date + interval (default).
  --anchor due            Next due = previous due date + interval, however late it was done.

SEASONS:
  --months 4-10           Only due April..October; out-of-season dates move to the 1st of the next eligible month.
  --except-months 12-2    Same, expressed as excluded months.

STATUS:
  upcoming | due | overdue | snoozed | completed
  advisories: closing_soon (season ends soon), seasonally_blocked (pushed or out of season)

EXIT CODES:
  0  Success
  1  Error (validation, not found, DB, etc.)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the .upkeep directory and database here
    Init,

    /// Add a task
    Add {
        /// Task title
        title: String,
        /// First due date
        #[arg(long)]
        due: String,
        #[command(flatten)]
        schedule: ScheduleArgs,
        #[command(flatten)]
        season: SeasonArgs,
        #[arg(long)]
        notes: Option<String>,
        /// List/group label, e.g. Garden
        #[arg(long)]
        list: Option<String>,
    },

    /// List outstanding tasks
    List {
        /// upcoming | due | overdue | snoozed | completed
        #[arg(long)]
        status: Option<String>,
        /// closing_soon | seasonally_blocked
        #[arg(long)]
        advisory: Option<String>,
        #[arg(long)]
        list: Option<String>,
        /// Only tasks due on or before this date
        #[arg(long)]
        before: Option<String>,
        /// Include completed one-off tasks
        #[arg(long)]
        all: bool,
    },

    /// Show task details and completion history
    Show {
        reference: String,
    },

    /// Mark a task done
    #[command(after_help = "\
NOTE:
  One-off tasks become completed and cannot be completed again.
  Recurring tasks get their next due date; any snooze is cleared.")]
    Done {
        reference: String,
        /// Completion date (defaults to today)
        #[arg(long)]
        on: Option<String>,
    },

    /// Hide a task until a date without changing its due date
    Snooze {
        reference: String,
        #[arg(long)]
        until: String,
    },

    /// Clear a snooze
    Unsnooze {
        reference: String,
    },

    /// Change a task. Schedule changes apply from the current due date on.
    Edit {
        reference: String,
        #[arg(long)]
        title: Option<String>,
        /// New notes (empty string clears)
        #[arg(long)]
        notes: Option<String>,
        /// New list label (empty string clears)
        #[arg(long)]
        list: Option<String>,
        /// Make the task one-off
        #[arg(long, conflicts_with_all = ["every", "anchor"])]
        once: bool,
        #[command(flatten)]
        schedule: EditScheduleArgs,
        #[command(flatten)]
        season: SeasonArgs,
        /// Remove the seasonal window
        #[arg(long, conflicts_with_all = ["months", "except_months"])]
        any_month: bool,
    },

    /// Delete a task
    Delete {
        reference: String,
    },

    /// Dry-run: evaluate a task on a given day without changing it
    Preview {
        reference: String,
        /// Day to evaluate (defaults to today)
        #[arg(long)]
        on: Option<String>,
    },

    /// Summary counts by status
    Status,

    /// Clear expired snoozes and refresh stored statuses
    Refresh,

    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Repeat interval, e.g. 4w, 10d, 1m, 1y (omit for a one-off task)
    #[arg(long)]
    pub every: Option<String>,
    /// completion (default) | due
    #[arg(long)]
    pub anchor: Option<String>,
}

#[derive(Args)]
pub struct EditScheduleArgs {
    /// New repeat interval
    #[arg(long)]
    pub every: Option<String>,
    /// New anchor: completion | due
    #[arg(long)]
    pub anchor: Option<String>,
}

#[derive(Args)]
pub struct SeasonArgs {
    /// Eligible months, e.g. 4-10, apr-oct, 12-2, 1,2,12
    #[arg(long, conflicts_with = "except_months")]
    pub months: Option<String>,
    /// Excluded months, same syntax as --months
    #[arg(long)]
    pub except_months: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current settings
    Show,
    /// Set a value, e.g. `upkeep config set closing_soon_days 10`
    Set {
        key: String,
        value: String,
    },
}
