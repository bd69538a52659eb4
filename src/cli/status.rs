use serde_json::json;

use crate::cli::{manager, print_json, Context};
use crate::db::connection;
use crate::error::UpkeepError;
use crate::models::{Task, TaskFilter, TaskStatus};
use crate::output::{self, StatusCounts};

fn needs_attention(t: &Task) -> bool {
    matches!(t.status, TaskStatus::Overdue | TaskStatus::Due)
}

pub fn run_status(ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let filter = TaskFilter {
        include_completed: true,
        ..TaskFilter::default()
    };
    let tasks = manager(&conn, ctx)?.list(&filter)?;
    let counts = StatusCounts::from_tasks(&tasks);
    let attention: Vec<&Task> = tasks.iter().filter(|t| needs_attention(t)).collect();

    if ctx.json {
        let attention_json: Vec<_> = attention.iter().map(|t| output::json::task_summary(t)).collect();
        print_json(&output::json::success(json!({
            "today": ctx.today,
            "counts": output::json::counts_json(&counts),
            "attention": attention_json
        })));
    } else {
        output::text::print_counts(&counts);
        if !attention.is_empty() {
            println!("\nNeeds attention:");
            let attention: Vec<Task> = attention.into_iter().cloned().collect();
            output::text::print_task_list(&attention);
        }
    }
    Ok(0)
}

pub fn run_refresh(ctx: &Context) -> Result<i32, UpkeepError> {
    let conn = connection::open_db()?;
    let changed = connection::immediate(&conn, || manager(&conn, ctx)?.refresh())?;

    if ctx.json {
        print_json(&output::json::success(json!({ "changed": changed })));
    } else {
        println!("Refreshed {changed} task(s)");
    }
    Ok(0)
}
