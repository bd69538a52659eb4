//! Task lifecycle: the only place task records are mutated.
//!
//! Every mutating call loads the task, applies the event, re-runs the
//! scheduler to refresh the cached due date/status, and saves it back.
//! Callers serialize concurrent writers to the same task.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::UpkeepError;
use crate::models::{
    AnchorMode, Completion, NewTask, RecurrencePolicy, Task, TaskFilter, TaskPatch, TaskStatus,
};
use crate::store::TaskStore;

use super::clock::Clock;
use super::recurrence::{self, Cadence};
use super::scheduler::{self, Evaluation, Scheduler};

pub struct TaskManager<S, C> {
    store: S,
    clock: C,
    scheduler: Scheduler,
}

impl<S: TaskStore, C: Clock> TaskManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            scheduler: Scheduler::default(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn create(&mut self, new: NewTask) -> Result<Task, UpkeepError> {
        let title = validate_title(&new.title)?;
        new.policy.validate()?;

        let mut task = Task {
            id: ulid::Ulid::new().to_string(),
            title,
            notes: clean_text(new.notes),
            list: clean_text(new.list),
            policy: new.policy,
            window: new.window,
            initial_due: new.due,
            cadence_step: None,
            last_completed: None,
            snoozed_until: None,
            terminal: false,
            history: Vec::new(),
            due_date: None,
            status: TaskStatus::Upcoming,
            advisories: Vec::new(),
        };
        self.refresh_task(&mut task);
        self.store.save(&task)?;
        debug!(task_id = %task.id, policy = %task.policy, due = ?task.due_date, "task created");
        Ok(task)
    }

    /// Load a task with its derived state brought up to today (not saved).
    pub fn get(&self, id: &str) -> Result<Task, UpkeepError> {
        let mut task = self.store.load(id)?;
        self.refresh_task(&mut task);
        Ok(task)
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, UpkeepError> {
        let mut tasks = self.store.load_all()?;
        for task in &mut tasks {
            self.refresh_task(task);
        }
        tasks.retain(|t| filter.matches(t));
        tasks.sort_by(|a, b| {
            (a.due_date.is_none(), a.due_date, &a.title).cmp(&(b.due_date.is_none(), b.due_date, &b.title))
        });
        Ok(tasks)
    }

    pub fn complete(&mut self, id: &str, on: NaiveDate) -> Result<Task, UpkeepError> {
        let today = self.clock.today();
        let mut task = self.store.load(id)?;
        if task.terminal {
            return Err(UpkeepError::already_completed(&task.id));
        }

        let current = self.scheduler.evaluate(&task, today);
        task.history.push(Completion {
            completed_on: on,
            due_on: current.due_date,
        });
        task.last_completed = Some(on);
        task.snoozed_until = None;

        match task.policy {
            RecurrencePolicy::NonRecurring => task.terminal = true,
            RecurrencePolicy::Recurring {
                interval,
                anchor: AnchorMode::FromDueDate,
            } => {
                let cadence = Cadence {
                    origin: task.initial_due,
                    step: task.cadence_step.map_or(0, |k| k.saturating_add(1)),
                };
                let floor = current.due_date.unwrap_or(task.initial_due);
                let next = recurrence::first_step_after(cadence, &interval, floor);
                task.cadence_step = Some(next - 1);
            }
            RecurrencePolicy::Recurring {
                anchor: AnchorMode::FromCompletion,
                ..
            } => {}
        }

        self.refresh_task(&mut task);
        self.store.save(&task)?;
        debug!(
            task_id = %task.id,
            completed_on = %on,
            next_due = ?task.due_date,
            terminal = task.terminal,
            "task completed"
        );
        Ok(task)
    }

    pub fn snooze(&mut self, id: &str, until: NaiveDate) -> Result<Task, UpkeepError> {
        let today = self.clock.today();
        let mut task = self.store.load(id)?;
        if task.terminal {
            return Err(UpkeepError::already_completed(&task.id));
        }
        if until <= today {
            return Err(UpkeepError::validation(format!(
                "Snooze date {until} must be after today ({today})"
            )));
        }
        task.snoozed_until = Some(until);
        self.refresh_task(&mut task);
        self.store.save(&task)?;
        debug!(task_id = %task.id, until = %until, "task snoozed");
        Ok(task)
    }

    pub fn unsnooze(&mut self, id: &str) -> Result<Task, UpkeepError> {
        let mut task = self.store.load(id)?;
        task.snoozed_until = None;
        self.refresh_task(&mut task);
        self.store.save(&task)?;
        debug!(task_id = %task.id, "snooze cleared");
        Ok(task)
    }

    /// Apply a partial update. Schedule changes take effect from the task's
    /// current anchor; completed occurrences are not replayed.
    pub fn edit(&mut self, id: &str, patch: TaskPatch) -> Result<Task, UpkeepError> {
        let mut task = self.store.load(id)?;
        if patch.touches_schedule() && task.terminal {
            return Err(UpkeepError::already_completed(&task.id));
        }

        let title = patch.title.as_deref().map(validate_title).transpose()?;
        if let Some(ref policy) = patch.policy {
            policy.validate()?;
        }

        if let Some(policy) = patch.policy {
            if policy != task.policy {
                rebase_schedule(&mut task, policy);
            }
        }
        if let Some(window) = patch.window {
            task.window = window;
        }
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(notes) = patch.notes {
            task.notes = clean_text(notes);
        }
        if let Some(list) = patch.list {
            task.list = clean_text(list);
        }

        self.refresh_task(&mut task);
        self.store.save(&task)?;
        debug!(task_id = %task.id, policy = %task.policy, due = ?task.due_date, "task edited");
        Ok(task)
    }

    pub fn delete(&mut self, id: &str) -> Result<Task, UpkeepError> {
        let task = self.store.load(id)?;
        self.store.delete(&task.id)?;
        debug!(task_id = %task.id, "task deleted");
        Ok(task)
    }

    /// Dry-run evaluation of a stored task on an arbitrary day.
    pub fn preview(&self, id: &str, on: NaiveDate) -> Result<Evaluation, UpkeepError> {
        let task = self.store.load(id)?;
        Ok(self.scheduler.evaluate(&task, on))
    }

    /// Clear expired snoozes and re-cache derived state for every task.
    /// Returns how many records changed.
    pub fn refresh(&mut self) -> Result<usize, UpkeepError> {
        let mut changed = 0;
        for mut task in self.store.load_all()? {
            let before = task.clone();
            self.refresh_task(&mut task);
            if task != before {
                self.store.save(&task)?;
                changed += 1;
            }
        }
        info!(changed, "refreshed task states");
        Ok(changed)
    }

    fn refresh_task(&self, task: &mut Task) {
        let today = self.clock.today();
        if task.snoozed_until.is_some_and(|until| today >= until) {
            debug!(task_id = %task.id, "snooze expired");
            task.snoozed_until = None;
        }
        let eval = self.scheduler.evaluate(task, today);
        task.due_date = eval.due_date;
        task.status = eval.status;
        task.advisories = eval.advisories;
    }
}

/// Switch `task` to `policy`, measuring the next occurrence from the anchor
/// the new policy uses: the last accounted due date for `FromDueDate`, the
/// last completion for `FromCompletion`. Never-completed tasks keep their
/// first due date.
fn rebase_schedule(task: &mut Task, policy: RecurrencePolicy) {
    match policy {
        RecurrencePolicy::NonRecurring => {
            if let Some(current) = scheduler::natural_due(task) {
                task.initial_due = current;
            }
            task.cadence_step = None;
        }
        RecurrencePolicy::Recurring {
            anchor: AnchorMode::FromCompletion,
            ..
        } => task.cadence_step = None,
        RecurrencePolicy::Recurring {
            anchor: AnchorMode::FromDueDate,
            ..
        } => {
            let last_due = match (task.policy, task.cadence_step) {
                (
                    RecurrencePolicy::Recurring {
                        interval,
                        anchor: AnchorMode::FromDueDate,
                    },
                    Some(step),
                ) => Some(recurrence::advance(task.initial_due, &interval, step)),
                (
                    RecurrencePolicy::Recurring {
                        anchor: AnchorMode::FromCompletion,
                        ..
                    },
                    _,
                ) => task.last_completed,
                _ => None,
            };
            match last_due {
                Some(anchor) => {
                    task.initial_due = anchor;
                    task.cadence_step = Some(0);
                }
                None => task.cadence_step = None,
            }
        }
    }
    task.policy = policy;
}

fn validate_title(title: &str) -> Result<String, UpkeepError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(UpkeepError::validation("Task title must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn clean_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
