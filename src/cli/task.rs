use serde_json::json;

use crate::cli::commands::{EditScheduleArgs, ScheduleArgs, SeasonArgs};
use crate::cli::{manager, parse_date, print_json, Context};
use crate::db::{connection, task_repo};
use crate::error::UpkeepError;
use crate::models::{
    Advisory, AnchorMode, Interval, NewTask, RecurrencePolicy, SeasonalWindow, Task, TaskFilter,
    TaskPatch, TaskStatus,
};
use crate::output;

/// Flags accepted by `upkeep edit`.
pub struct EditArgs {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub list: Option<String>,
    pub once: bool,
    pub schedule: EditScheduleArgs,
    pub season: SeasonArgs,
    pub any_month: bool,
}

fn parse_anchor(s: &str) -> Result<AnchorMode, UpkeepError> {
    AnchorMode::from_str(s).ok_or_else(|| {
        UpkeepError::validation(format!("Invalid anchor '{s}'. Use: completion, due"))
    })
}

fn build_policy(schedule: &ScheduleArgs) -> Result<RecurrencePolicy, UpkeepError> {
    match schedule.every.as_deref() {
        None if schedule.anchor.is_some() => {
            Err(UpkeepError::validation("--anchor needs --every"))
        }
        None => Ok(RecurrencePolicy::NonRecurring),
        Some(every) => {
            let interval: Interval = every.parse()?;
            let anchor = match schedule.anchor.as_deref() {
                Some(a) => parse_anchor(a)?,
                None => AnchorMode::FromCompletion,
            };
            Ok(RecurrencePolicy::recurring(interval, anchor))
        }
    }
}

fn build_window(season: &SeasonArgs) -> Result<Option<SeasonalWindow>, UpkeepError> {
    if let Some(ref months) = season.months {
        return SeasonalWindow::parse_allow(months).map(Some);
    }
    if let Some(ref months) = season.except_months {
        return SeasonalWindow::parse_deny(months).map(Some);
    }
    Ok(None)
}

/// Empty string clears an optional text field.
fn text_patch(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.trim().is_empty() { None } else { Some(v) })
}

fn edit_policy(current: &RecurrencePolicy, args: &EditArgs) -> Result<Option<RecurrencePolicy>, UpkeepError> {
    if args.once {
        return Ok(Some(RecurrencePolicy::NonRecurring));
    }
    let anchor = args.schedule.anchor.as_deref().map(parse_anchor).transpose()?;
    let interval = args
        .schedule
        .every
        .as_deref()
        .map(str::parse::<Interval>)
        .transpose()?;

    match (interval, anchor, current) {
        (None, None, _) => Ok(None),
        (Some(interval), anchor, current) => Ok(Some(RecurrencePolicy::recurring(
            interval,
            anchor
                .or_else(|| current.anchor())
                .unwrap_or(AnchorMode::FromCompletion),
        ))),
        (None, Some(anchor), RecurrencePolicy::Recurring { interval, .. }) => {
            Ok(Some(RecurrencePolicy::recurring(*interval, anchor)))
        }
        (None, Some(_), RecurrencePolicy::NonRecurring) => Err(UpkeepError::validation(
            "Task does not repeat; give --every along with --anchor",
        )),
    }
}

fn edit_window(args: &EditArgs) -> Result<Option<Option<SeasonalWindow>>, UpkeepError> {
    if args.any_month {
        return Ok(Some(None));
    }
    Ok(build_window(&args.season)?.map(Some))
}

fn print_task_result(task: &Task, verb: &str, ctx: &Context) {
    if ctx.json {
        print_json(&output::json::success(json!({
            "task": output::json::task_detail(task)
        })));
    } else {
        println!("{verb}: {} ({})", task.title, task.id);
    }
}

pub fn run_add(
    title: &str,
    due: &str,
    schedule: &ScheduleArgs,
    season: &SeasonArgs,
    notes: Option<String>,
    list: Option<String>,
    ctx: &Context,
) -> Result<i32, UpkeepError> {
    let due = parse_date(due, "due date")?;
    let policy = build_policy(schedule)?;
    let window = build_window(season)?;

    let mut new = NewTask::new(title, policy, due);
    if let Some(window) = window {
        new = new.with_window(window);
    }
    if let Some(notes) = notes {
        new = new.with_notes(notes);
    }
    if let Some(list) = list {
        new = new.with_list(list);
    }

    let conn = connection::open_db()?;
    let task = connection::immediate(&conn, || manager(&conn, ctx)?.create(new))?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!("Added task: {} ({}), due {due}", task.title, task.id);
    }
    Ok(0)
}

pub fn run_list(
    status: Option<&str>,
    advisory: Option<&str>,
    list: Option<String>,
    before: Option<&str>,
    all: bool,
    ctx: &Context,
) -> Result<i32, UpkeepError> {
    let status = status
        .map(|s| {
            TaskStatus::from_str(s).ok_or_else(|| {
                UpkeepError::validation(format!(
                    "Invalid status '{s}'. Use: upcoming, due, overdue, snoozed, completed"
                ))
            })
        })
        .transpose()?;
    let advisory = advisory
        .map(|a| {
            Advisory::from_str(a).ok_or_else(|| {
                UpkeepError::validation(format!(
                    "Invalid advisory '{a}'. Use: closing_soon, seasonally_blocked"
                ))
            })
        })
        .transpose()?;
    let due_on_or_before = before.map(|b| parse_date(b, "date")).transpose()?;
    let filter = TaskFilter {
        status,
        advisory,
        list,
        due_on_or_before,
        include_completed: all,
    };

    let conn = connection::open_db()?;
    let tasks = manager(&conn, ctx)?.list(&filter)?;

    if ctx.json {
        let tasks_json: Vec<_> = tasks.iter().map(output::json::task_summary).collect();
        print_json(&output::json::success(json!({
            "today": ctx.today,
            "tasks": tasks_json
        })));
    } else {
        output::text::print_task_list(&tasks);
    }
    Ok(0)
}

pub fn run_show(reference: &str, ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let task = manager(&conn, ctx)?.get(&id)?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        output::text::print_task(&task);
    }
    Ok(0)
}

pub fn run_done(reference: &str, on: Option<&str>, ctx: &Context) -> Result<i32, UpkeepError> {
    let on = match on {
        Some(s) => parse_date(s, "completion date")?,
        None => ctx.today,
    };
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let task = connection::immediate(&conn, || manager(&conn, ctx)?.complete(&id, on))?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "task": output::json::task_detail(&task),
            "next_due": task.due_date
        })));
    } else if let Some(next) = task.due_date {
        println!("Done: {}. Next due {next}", task.title);
    } else {
        println!("Completed: {}", task.title);
    }
    Ok(0)
}

pub fn run_snooze(reference: &str, until: &str, ctx: &Context) -> Result<i32, UpkeepError> {
    let until = parse_date(until, "snooze date")?;
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let task = connection::immediate(&conn, || manager(&conn, ctx)?.snooze(&id, until))?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        println!("Snoozed: {} until {until}", task.title);
    }
    Ok(0)
}

pub fn run_unsnooze(reference: &str, ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let task = connection::immediate(&conn, || manager(&conn, ctx)?.unsnooze(&id))?;
    print_task_result(&task, "Unsnoozed", ctx);
    Ok(0)
}

pub fn run_edit(reference: &str, args: EditArgs, ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let current = task_repo::resolve_task(&conn, reference)?;

    let patch = TaskPatch {
        policy: edit_policy(&current.policy, &args)?,
        window: edit_window(&args)?,
        title: args.title,
        notes: text_patch(args.notes),
        list: text_patch(args.list),
    };
    if patch.is_empty() {
        return Err(UpkeepError::validation("Nothing to change"));
    }

    let task = connection::immediate(&conn, || manager(&conn, ctx)?.edit(&current.id, patch))?;
    print_task_result(&task, "Updated", ctx);
    Ok(0)
}

pub fn run_delete(reference: &str, ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let task = connection::immediate(&conn, || manager(&conn, ctx)?.delete(&id))?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "deleted": { "id": task.id, "title": task.title }
        })));
    } else {
        println!("Deleted: {} ({})", task.title, task.id);
    }
    Ok(0)
}

pub fn run_preview(reference: &str, on: Option<&str>, ctx: &Context) -> Result<i32, UpkeepError> {
    let on = match on {
        Some(s) => parse_date(s, "date")?,
        None => ctx.today,
    };
    let conn = connection::open_db()?;
    let id = task_repo::resolve_task(&conn, reference)?.id;
    let mgr = manager(&conn, ctx)?;
    let task = mgr.get(&id)?;
    let evaluation = mgr.preview(&id, on)?;

    if ctx.json {
        print_json(&output::json::success(json!({
            "id": task.id,
            "title": task.title,
            "on": on,
            "evaluation": output::json::evaluation_json(&evaluation)
        })));
    } else {
        output::text::print_evaluation(&task, &evaluation);
    }
    Ok(0)
}
