use serde_json::json;

use crate::cli::{print_json, Context};
use crate::config::Config;
use crate::db::connection;
use crate::error::UpkeepError;
use crate::output;

pub fn run(ctx: &Context) -> Result<i32, UpkeepError> {
    let db_path = connection::init_db()?;
    let config_path = match db_path.parent() {
        Some(dir) => connection::config_path_in(dir),
        None => connection::config_path()?,
    };
    if !config_path.exists() {
        Config::default().save(&config_path)?;
    }

    if ctx.json {
        print_json(&output::json::success(json!({
            "path": db_path.to_string_lossy(),
            "config": config_path.to_string_lossy()
        })));
    } else {
        println!("Initialized upkeep at {}", db_path.display());
    }
    Ok(0)
}
