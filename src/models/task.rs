use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{RecurrencePolicy, SeasonalWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Upcoming,
    Due,
    Overdue,
    Snoozed,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Due => "due",
            Self::Overdue => "overdue",
            Self::Snoozed => "snoozed",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(Self::Upcoming),
            "due" => Some(Self::Due),
            "overdue" => Some(Self::Overdue),
            "snoozed" => Some(Self::Snoozed),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Informational flags reported next to the primary status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// The current seasonal window ends soon and the task is still outstanding.
    ClosingSoon,
    /// The task was pushed to a later season, or its window closed while it was outstanding.
    SeasonallyBlocked,
}

impl Advisory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosingSoon => "closing_soon",
            Self::SeasonallyBlocked => "seasonally_blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "closing_soon" => Some(Self::ClosingSoon),
            "seasonally_blocked" => Some(Self::SeasonallyBlocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completed_on: NaiveDate,
    /// The due date in force when the task was done.
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub notes: Option<String>,
    pub list: Option<String>,
    pub policy: RecurrencePolicy,
    pub window: Option<SeasonalWindow>,

    // Canonical scheduling state.
    pub initial_due: NaiveDate,
    pub cadence_step: Option<u32>,
    pub last_completed: Option<NaiveDate>,
    pub snoozed_until: Option<NaiveDate>,
    pub terminal: bool,
    pub history: Vec<Completion>,

    // Derived by the scheduler; refreshed on every mutation.
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub advisories: Vec<Advisory>,
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    pub list: Option<String>,
    pub policy: RecurrencePolicy,
    pub window: Option<SeasonalWindow>,
    pub due: NaiveDate,
}

impl NewTask {
    pub fn new(title: impl Into<String>, policy: RecurrencePolicy, due: NaiveDate) -> Self {
        Self {
            title: title.into(),
            notes: None,
            list: None,
            policy,
            window: None,
            due,
        }
    }

    pub fn with_window(mut self, window: SeasonalWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.list = Some(list.into());
        self
    }
}

/// Partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub list: Option<Option<String>>,
    pub policy: Option<RecurrencePolicy>,
    pub window: Option<Option<SeasonalWindow>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.list.is_none()
            && self.policy.is_none()
            && self.window.is_none()
    }

    pub fn touches_schedule(&self) -> bool {
        self.policy.is_some() || self.window.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub advisory: Option<Advisory>,
    pub list: Option<String>,
    pub due_on_or_before: Option<NaiveDate>,
    pub include_completed: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if task.status.is_terminal()
            && !self.include_completed
            && self.status != Some(TaskStatus::Completed)
        {
            return false;
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(advisory) = self.advisory {
            if !task.advisories.contains(&advisory) {
                return false;
            }
        }
        if let Some(ref list) = self.list {
            let same = task
                .list
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(list));
            if !same {
                return false;
            }
        }
        if let Some(limit) = self.due_on_or_before {
            match task.due_date {
                Some(due) if due <= limit => {}
                _ => return false,
            }
        }
        true
    }
}
