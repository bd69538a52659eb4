use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::scheduler::{SchedulerOptions, DEFAULT_CLOSING_SOON_DAYS};
use crate::error::UpkeepError;

fn default_closing_soon_days() -> u32 {
    DEFAULT_CLOSING_SOON_DAYS
}

/// Settings stored in `config.json` next to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_closing_soon_days")]
    pub closing_soon_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            closing_soon_days: default_closing_soon_days(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 1] = ["closing_soon_days"];

    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, UpkeepError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|e| UpkeepError::config(format!("Cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| UpkeepError::config(format!("Invalid config {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), UpkeepError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| UpkeepError::config(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| UpkeepError::config(e.to_string()))?;
        fs::write(path, text).map_err(|e| UpkeepError::config(e.to_string()))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), UpkeepError> {
        match key.replace('-', "_").as_str() {
            "closing_soon_days" => {
                self.closing_soon_days = value.parse().map_err(|_| {
                    UpkeepError::config(format!(
                        "closing_soon_days must be a non-negative whole number of days, got '{value}'"
                    ))
                })?;
                Ok(())
            }
            _ => Err(UpkeepError::config(format!(
                "Unknown config key '{key}'. Known keys: {}",
                Self::KEYS.join(", ")
            ))),
        }
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            closing_soon_days: self.closing_soon_days,
        }
    }
}
