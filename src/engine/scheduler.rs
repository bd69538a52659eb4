//! Due-date and status evaluation.
//!
//! The scheduler is a pure function of a task's canonical state and the
//! caller's "today": it never mutates the task and never fails for a task
//! that passed validation.

use chrono::{Datelike, NaiveDate};
use crate::models::{Advisory, AnchorMode, RecurrencePolicy, Task, TaskStatus};

use super::calendar;
use super::recurrence::{self, Anchor, Cadence};

pub const DEFAULT_CLOSING_SOON_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// How close the end of a seasonal window must be before `ClosingSoon` is raised.
    pub closing_soon_days: u32,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            closing_soon_days: DEFAULT_CLOSING_SOON_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub due_date: Option<NaiveDate>,
    /// Recurrence result before any seasonal push.
    pub natural_due: Option<NaiveDate>,
    pub status: TaskStatus,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    options: SchedulerOptions,
}

impl Scheduler {
    pub fn new(options: SchedulerOptions) -> Self {
        Self { options }
    }

    pub fn evaluate(&self, task: &Task, today: NaiveDate) -> Evaluation {
        let Some(natural) = natural_due(task) else {
            return Evaluation {
                due_date: None,
                natural_due: None,
                status: TaskStatus::Completed,
                advisories: Vec::new(),
            };
        };
        let due = seasonal_adjust(task, natural);

        if task.snoozed_until.is_some_and(|until| today < until) {
            return Evaluation {
                due_date: Some(due),
                natural_due: Some(natural),
                status: TaskStatus::Snoozed,
                advisories: Vec::new(),
            };
        }

        let status = if today > due {
            TaskStatus::Overdue
        } else if today == due {
            TaskStatus::Due
        } else {
            TaskStatus::Upcoming
        };

        let window = task.window.as_ref();
        let mut advisories = Vec::new();

        if let Some(close) = calendar::window_close(window, today) {
            let days_left = (close - today).num_days();
            if due <= close && days_left <= i64::from(self.options.closing_soon_days) {
                advisories.push(Advisory::ClosingSoon);
            }
        }

        let pushed_past_natural = due != natural && today > natural;
        let window_closed_on_it =
            status == TaskStatus::Overdue && !calendar::is_eligible(window, today.month());
        if pushed_past_natural || window_closed_on_it {
            advisories.push(Advisory::SeasonallyBlocked);
        }

        Evaluation {
            due_date: Some(due),
            natural_due: Some(natural),
            status,
            advisories,
        }
    }
}

/// Evaluate with default options.
pub fn evaluate(task: &Task, today: NaiveDate) -> Evaluation {
    Scheduler::default().evaluate(task, today)
}

/// The un-adjusted due date of the task's current occurrence, `None` once terminal.
pub fn natural_due(task: &Task) -> Option<NaiveDate> {
    if task.terminal {
        return None;
    }
    let policy = &task.policy;
    match policy {
        RecurrencePolicy::NonRecurring => Some(task.initial_due),
        RecurrencePolicy::Recurring {
            anchor: AnchorMode::FromCompletion,
            ..
        } => match task.last_completed {
            None => Some(task.initial_due),
            Some(completed) => recurrence::next_due(
                policy,
                &Anchor {
                    completed,
                    due: Cadence::at(task.initial_due),
                },
            )
            .ok(),
        },
        RecurrencePolicy::Recurring {
            anchor: AnchorMode::FromDueDate,
            ..
        } => match task.cadence_step {
            None => Some(task.initial_due),
            Some(step) => recurrence::next_due(
                policy,
                &Anchor {
                    completed: task.last_completed.unwrap_or(task.initial_due),
                    due: Cadence {
                        origin: task.initial_due,
                        step,
                    },
                },
            )
            .ok(),
        },
    }
}

/// Push `natural` forward into the task's seasonal window.
pub fn seasonal_adjust(task: &Task, natural: NaiveDate) -> NaiveDate {
    let window = task.window.as_ref();
    let mut due = natural;
    // One pass is enough for a month set; re-check anyway, bounded.
    for _ in 0..12 {
        if calendar::is_eligible(window, due.month()) {
            break;
        }
        due = calendar::next_eligible_date(window, due);
    }
    due
}
