use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{ErrorCode, UpkeepError};

use super::migrations;

pub const DATA_DIR_NAME: &str = ".upkeep";
pub const DATA_DIR_ENV: &str = "UPKEEP_DIR";

/// Locate the data directory: `$UPKEEP_DIR` if set, otherwise the nearest
/// `.upkeep` directory walking up from the current directory.
pub fn find_data_dir() -> Result<PathBuf, UpkeepError> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let mut dir = env::current_dir().map_err(|e| UpkeepError::database(e.to_string()))?;
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !dir.pop() {
            return Err(UpkeepError::new(
                ErrorCode::NotInitialized,
                "No .upkeep directory found here or in any parent. Run `upkeep init` first.",
            ));
        }
    }
}

/// Directory `init` creates: `$UPKEEP_DIR` or `./.upkeep`.
pub fn init_data_dir() -> Result<PathBuf, UpkeepError> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let cwd = env::current_dir().map_err(|e| UpkeepError::database(e.to_string()))?;
    Ok(cwd.join(DATA_DIR_NAME))
}

pub fn db_path_in(dir: &Path) -> PathBuf {
    dir.join("upkeep.db")
}

pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf, UpkeepError> {
    Ok(config_path_in(&find_data_dir()?))
}

/// Open the database. Returns error if not initialized.
pub fn open_db() -> Result<Connection, UpkeepError> {
    let path = db_path_in(&find_data_dir()?);
    if !path.exists() {
        return Err(UpkeepError::not_initialized());
    }
    debug!(path = %path.display(), "opening database");
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Create the data directory and database, and run migrations. Idempotent.
pub fn init_db() -> Result<PathBuf, UpkeepError> {
    let dir = init_data_dir()?;
    fs::create_dir_all(&dir).map_err(|e| UpkeepError::database(e.to_string()))?;
    let path = db_path_in(&dir);
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    info!(path = %path.display(), "database initialized");
    Ok(path)
}

/// In-memory database with the schema applied.
pub fn open_in_memory() -> Result<Connection, UpkeepError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Run `f` inside `BEGIN IMMEDIATE`, committing on success and rolling back
/// on error. Serializes writers across processes.
pub fn immediate<T>(
    conn: &Connection,
    f: impl FnOnce() -> Result<T, UpkeepError>,
) -> Result<T, UpkeepError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f() {
        Ok(value) => {
            conn.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

fn configure_connection(conn: &Connection) -> Result<(), UpkeepError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}
