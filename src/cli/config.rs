use serde_json::json;

use crate::cli::commands::ConfigCommands;
use crate::cli::{print_json, Context};
use crate::config::Config;
use crate::db::connection;
use crate::error::UpkeepError;
use crate::output;

pub fn run(cmd: ConfigCommands, ctx: &Context) -> Result<i32, UpkeepError> {
    let path = connection::config_path()?;
    let mut config = Config::load(&path)?;

    if let ConfigCommands::Set { key, value } = cmd {
        config.set(&key, &value)?;
        config.save(&path)?;
        tracing::info!(key = %key, value = %value, "config updated");
    }

    if ctx.json {
        print_json(&output::json::success(json!({
            "path": path.to_string_lossy(),
            "config": config
        })));
    } else {
        println!("closing_soon_days = {}", config.closing_soon_days);
    }
    Ok(0)
}
