use crate::engine::Evaluation;
use crate::models::{Advisory, Task};

use super::StatusCounts;

fn short_id(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

fn advisory_label(a: &Advisory) -> &'static str {
    match a {
        Advisory::ClosingSoon => "window closing soon",
        Advisory::SeasonallyBlocked => "out of season",
    }
}

fn advisory_suffix(advisories: &[Advisory]) -> String {
    if advisories.is_empty() {
        return String::new();
    }
    let labels: Vec<&str> = advisories.iter().map(advisory_label).collect();
    format!(" !{}", labels.join(", !"))
}

pub fn print_task(t: &Task) {
    println!("Task: {} ({})", t.title, t.id);
    if let Some(ref list) = t.list {
        println!("  List: {list}");
    }
    if let Some(ref notes) = t.notes {
        println!("  Notes: {notes}");
    }
    println!("  Repeats: {}", t.policy);
    if let Some(ref window) = t.window {
        println!("  Season: {window}");
    }
    println!("  Status: {}{}", t.status.as_str(), advisory_suffix(&t.advisories));
    match t.due_date {
        Some(due) => println!("  Due: {due}"),
        None => println!("  Due: -"),
    }
    if let Some(until) = t.snoozed_until {
        println!("  Snoozed until: {until}");
    }
    if let Some(done) = t.last_completed {
        println!("  Last done: {done}");
    }
    if !t.history.is_empty() {
        println!("  History:");
        for c in t.history.iter().rev() {
            match c.due_on {
                Some(due) => println!("    {} (due {})", c.completed_on, due),
                None => println!("    {}", c.completed_on),
            }
        }
    }
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        let due = t
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let list = t.list.as_deref().map(|l| format!(" #{l}")).unwrap_or_default();
        println!(
            "  [{}] {} {} ({}){}{}",
            t.status.as_str(),
            due,
            t.title,
            short_id(&t.id),
            list,
            advisory_suffix(&t.advisories)
        );
    }
}

pub fn print_evaluation(t: &Task, e: &Evaluation) {
    println!("Preview: {} ({})", t.title, short_id(&t.id));
    println!("  Status: {}{}", e.status.as_str(), advisory_suffix(&e.advisories));
    match (e.due_date, e.natural_due) {
        (Some(due), Some(natural)) if due != natural => {
            println!("  Due: {due} (pushed from {natural} by season)")
        }
        (Some(due), _) => println!("  Due: {due}"),
        (None, _) => println!("  Due: -"),
    }
}

pub fn print_counts(c: &StatusCounts) {
    println!(
        "Tasks: {} (overdue={} due={} upcoming={} snoozed={} completed={})",
        c.total, c.overdue, c.due, c.upcoming, c.snoozed, c.completed
    );
    if c.closing_soon > 0 || c.seasonally_blocked > 0 {
        println!(
            "  advisories: closing_soon={} seasonally_blocked={}",
            c.closing_soon, c.seasonally_blocked
        );
    }
}
