use clap::Parser;
use std::process;

use tracing_subscriber::EnvFilter;
use upkeep::cli::commands::Cli;
use upkeep::cli::{self, Context};
use upkeep::engine::{Clock, SystemClock};

const LOG_ENV: &str = "UPKEEP_LOG";

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() {
    let cli_args = Cli::parse();
    if let Err(e) = init_tracing() {
        eprintln!("warning: logging disabled: {e:#}");
    }
    let json_output = cli_args.json;

    let today = match cli_args.today.as_deref() {
        Some(s) => match cli::parse_date(s, "--today date") {
            Ok(d) => d,
            Err(e) => process::exit(cli::finish(Err(e), json_output)),
        },
        None => SystemClock.today(),
    };
    let ctx = Context {
        json: json_output,
        today,
    };

    process::exit(cli::run(cli_args.command, &ctx));
}
