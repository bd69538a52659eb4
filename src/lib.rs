//! Household upkeep scheduling.
//!
//! The [`engine`] computes when recurring and one-off chores fall due,
//! honouring completion dates, seasonal month windows and snoozes. The
//! [`db`], [`cli`] and [`output`] modules are the local front end around it.

pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod store;

pub use engine::{evaluate, Clock, Evaluation, FixedClock, Scheduler, SystemClock, TaskManager};
pub use error::{ErrorCode, PolicyViolation, UpkeepError};
pub use store::{MemoryStore, TaskStore};
