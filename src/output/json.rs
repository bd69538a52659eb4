use serde_json::{json, Value};

use crate::engine::Evaluation;
use crate::error::UpkeepError;
use crate::models::{Completion, RecurrencePolicy, Task};

use super::StatusCounts;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &UpkeepError) -> Value {
    let mut v = json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    });
    if let Some(ref violation) = err.violation {
        v["error"]["violation"] = json!(violation.to_string());
    }
    v
}

pub fn policy_json(p: &RecurrencePolicy) -> Value {
    match p {
        RecurrencePolicy::NonRecurring => json!({ "kind": "once" }),
        RecurrencePolicy::Recurring { interval, anchor } => json!({
            "kind": "recurring",
            "every": interval.to_short(),
            "anchor": anchor.as_str()
        }),
    }
}

pub fn task_summary(t: &Task) -> Value {
    let mut v = json!({
        "id": t.id,
        "title": t.title,
        "status": t.status.as_str(),
        "due_date": t.due_date,
    });
    if !t.advisories.is_empty() {
        v["advisories"] = json!(t.advisories.iter().map(|a| a.as_str()).collect::<Vec<_>>());
    }
    if let Some(ref list) = t.list {
        v["list"] = json!(list);
    }
    if let Some(until) = t.snoozed_until {
        v["snoozed_until"] = json!(until);
    }
    v
}

pub fn task_detail(t: &Task) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "notes": t.notes,
        "list": t.list,
        "policy": policy_json(&t.policy),
        "window": t.window.map(|w| w.months()),
        "status": t.status.as_str(),
        "advisories": t.advisories.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
        "due_date": t.due_date,
        "initial_due": t.initial_due,
        "last_completed": t.last_completed,
        "snoozed_until": t.snoozed_until,
        "history": t.history.iter().map(completion_json).collect::<Vec<_>>(),
    })
}

pub fn completion_json(c: &Completion) -> Value {
    json!({
        "completed_on": c.completed_on,
        "due_on": c.due_on
    })
}

pub fn evaluation_json(e: &Evaluation) -> Value {
    json!({
        "due_date": e.due_date,
        "natural_due": e.natural_due,
        "status": e.status.as_str(),
        "advisories": e.advisories.iter().map(|a| a.as_str()).collect::<Vec<_>>()
    })
}

pub fn counts_json(c: &StatusCounts) -> Value {
    json!({
        "total": c.total,
        "overdue": c.overdue,
        "due": c.due,
        "upcoming": c.upcoming,
        "snoozed": c.snoozed,
        "completed": c.completed,
        "closing_soon": c.closing_soon,
        "seasonally_blocked": c.seasonally_blocked
    })
}
