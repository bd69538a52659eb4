use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    TaskNotFound,
    AmbiguousRef,
    InvalidPolicy,
    NoNextOccurrence,
    AlreadyCompleted,
    ValidationError,
    DatabaseError,
    ConfigError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::InvalidPolicy => "INVALID_POLICY",
            Self::NoNextOccurrence => "NO_NEXT_OCCURRENCE",
            Self::AlreadyCompleted => "ALREADY_COMPLETED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

/// The invariant a rejected policy or seasonal window broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    NonPositiveInterval,
    EmptySeasonalWindow,
    MonthOutOfRange(u32),
    Unparseable(String),
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveInterval => write!(f, "interval must be positive"),
            Self::EmptySeasonalWindow => write!(f, "at least one month must be eligible"),
            Self::MonthOutOfRange(m) => write!(f, "month must be between 1 and 12 (got {m})"),
            Self::Unparseable(detail) => write!(f, "{detail}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct UpkeepError {
    pub code: ErrorCode,
    pub message: String,
    pub violation: Option<PolicyViolation>,
}

impl UpkeepError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violation: None,
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "upkeep is not initialized. Run `upkeep init` first.",
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn invalid_policy(violation: PolicyViolation) -> Self {
        Self {
            code: ErrorCode::InvalidPolicy,
            message: format!("Invalid policy: {violation}"),
            violation: Some(violation),
        }
    }

    pub fn no_next_occurrence() -> Self {
        Self::new(
            ErrorCode::NoNextOccurrence,
            "Non-recurring task has no further occurrences",
        )
    }

    pub fn already_completed(task_id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyCompleted,
            format!("Task {task_id} is already completed"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

impl From<rusqlite::Error> for UpkeepError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
