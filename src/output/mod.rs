pub mod json;
pub mod text;

use serde::Serialize;

use crate::models::{Advisory, Task, TaskStatus};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub overdue: usize,
    pub due: usize,
    pub upcoming: usize,
    pub snoozed: usize,
    pub completed: usize,
    pub closing_soon: usize,
    pub seasonally_blocked: usize,
}

impl StatusCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = Self::default();
        for t in tasks {
            counts.total += 1;
            match t.status {
                TaskStatus::Overdue => counts.overdue += 1,
                TaskStatus::Due => counts.due += 1,
                TaskStatus::Upcoming => counts.upcoming += 1,
                TaskStatus::Snoozed => counts.snoozed += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
            if t.advisories.contains(&Advisory::ClosingSoon) {
                counts.closing_soon += 1;
            }
            if t.advisories.contains(&Advisory::SeasonallyBlocked) {
                counts.seasonally_blocked += 1;
            }
        }
        counts
    }
}
