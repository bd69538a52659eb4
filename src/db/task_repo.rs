use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::UpkeepError;
use crate::models::{
    Advisory, AnchorMode, Completion, Interval, IntervalUnit, RecurrencePolicy, SeasonalWindow,
    Task, TaskStatus,
};
use crate::store::TaskStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str = "id, title, notes, list_name, interval_count, interval_unit, anchor_mode,
    season_mask, initial_due, cadence_step, last_completed, snoozed_until, terminal,
    due_date, status, advisories";

/// [`TaskStore`] over an open SQLite connection. Transactions are the
/// caller's business; see [`super::connection::immediate`].
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TaskStore for SqliteStore<'_> {
    fn load(&self, id: &str) -> Result<Task, UpkeepError> {
        get_task_by_id(self.conn, id)
    }

    fn save(&mut self, task: &Task) -> Result<(), UpkeepError> {
        save_task(self.conn, task)
    }

    fn load_all(&self) -> Result<Vec<Task>, UpkeepError> {
        list_tasks(self.conn)
    }

    fn delete(&mut self, id: &str) -> Result<(), UpkeepError> {
        delete_task(self.conn, id)
    }
}

/// Raw column values of one `tasks` row.
struct TaskRow {
    id: String,
    title: String,
    notes: Option<String>,
    list_name: Option<String>,
    interval_count: Option<i64>,
    interval_unit: Option<String>,
    anchor_mode: Option<String>,
    season_mask: Option<i64>,
    initial_due: String,
    cadence_step: Option<i64>,
    last_completed: Option<String>,
    snoozed_until: Option<String>,
    terminal: bool,
    due_date: Option<String>,
    status: String,
    advisories: String,
}

fn row_to_task_row(row: &rusqlite::Row) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        notes: row.get(2)?,
        list_name: row.get(3)?,
        interval_count: row.get(4)?,
        interval_unit: row.get(5)?,
        anchor_mode: row.get(6)?,
        season_mask: row.get(7)?,
        initial_due: row.get(8)?,
        cadence_step: row.get(9)?,
        last_completed: row.get(10)?,
        snoozed_until: row.get(11)?,
        terminal: row.get(12)?,
        due_date: row.get(13)?,
        status: row.get(14)?,
        advisories: row.get(15)?,
    })
}

impl TaskRow {
    fn into_task(self, history: Vec<Completion>) -> Result<Task, UpkeepError> {
        let policy = match (self.interval_count, self.interval_unit.as_deref()) {
            (None, _) => RecurrencePolicy::NonRecurring,
            (Some(count), Some(unit)) => {
                let unit = IntervalUnit::from_str(unit)
                    .ok_or_else(|| corrupt(&self.id, format!("interval unit '{unit}'")))?;
                let count = u32::try_from(count)
                    .map_err(|_| corrupt(&self.id, format!("interval count {count}")))?;
                let anchor = self
                    .anchor_mode
                    .as_deref()
                    .and_then(AnchorMode::from_str)
                    .ok_or_else(|| corrupt(&self.id, "anchor mode".to_string()))?;
                RecurrencePolicy::Recurring {
                    interval: Interval::new(count, unit)?,
                    anchor,
                }
            }
            (Some(_), None) => return Err(corrupt(&self.id, "missing interval unit".to_string())),
        };

        let window = self
            .season_mask
            .map(|mask| {
                u16::try_from(mask)
                    .map_err(|_| corrupt(&self.id, format!("season mask {mask}")))
                    .and_then(SeasonalWindow::from_mask)
            })
            .transpose()?;

        let cadence_step = self
            .cadence_step
            .map(|s| u32::try_from(s).map_err(|_| corrupt(&self.id, format!("cadence step {s}"))))
            .transpose()?;

        let advisories = self
            .advisories
            .split(',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| {
                let advisory = Advisory::from_str(s);
                if advisory.is_none() {
                    warn!(task_id = %self.id, advisory = s, "ignoring unknown advisory");
                }
                advisory
            })
            .collect();
        let status = TaskStatus::from_str(&self.status).unwrap_or_else(|| {
            warn!(task_id = %self.id, status = %self.status, "unknown cached status");
            TaskStatus::Upcoming
        });

        Ok(Task {
            initial_due: parse_date(&self.initial_due)?,
            last_completed: parse_opt_date(self.last_completed.as_deref())?,
            snoozed_until: parse_opt_date(self.snoozed_until.as_deref())?,
            due_date: parse_opt_date(self.due_date.as_deref())?,
            status,
            id: self.id,
            title: self.title,
            notes: self.notes,
            list: self.list_name,
            policy,
            window,
            cadence_step,
            terminal: self.terminal,
            history,
            advisories,
        })
    }
}

fn corrupt(id: &str, what: String) -> UpkeepError {
    UpkeepError::database(format!("Task {id} has an unreadable {what}"))
}

fn parse_date(s: &str) -> Result<NaiveDate, UpkeepError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| UpkeepError::database(format!("Bad date '{s}' in database: {e}")))
}

fn parse_opt_date(s: Option<&str>) -> Result<Option<NaiveDate>, UpkeepError> {
    s.map(parse_date).transpose()
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, UpkeepError> {
    let row = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            row_to_task_row,
        )
        .optional()?
        .ok_or_else(|| UpkeepError::task_not_found(id))?;
    let history = get_completions(conn, &row.id)?;
    row.into_task(history)
}

pub fn list_tasks(conn: &Connection) -> Result<Vec<Task>, UpkeepError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks ORDER BY due_date IS NULL, due_date ASC, title ASC"
    ))?;
    let rows = stmt
        .query_map([], row_to_task_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(|row| {
            let history = get_completions(conn, &row.id)?;
            row.into_task(history)
        })
        .collect()
}

/// Insert or update a task together with its completion history.
pub fn save_task(conn: &Connection, task: &Task) -> Result<(), UpkeepError> {
    let (interval_count, interval_unit, anchor_mode) = match task.policy {
        RecurrencePolicy::NonRecurring => (None, None, None),
        RecurrencePolicy::Recurring { interval, anchor } => (
            Some(i64::from(interval.count)),
            Some(interval.unit.as_str()),
            Some(anchor.as_str()),
        ),
    };
    let advisories: Vec<&str> = task.advisories.iter().map(|a| a.as_str()).collect();

    conn.execute(
        "INSERT INTO tasks (id, title, notes, list_name, interval_count, interval_unit, anchor_mode,
                            season_mask, initial_due, cadence_step, last_completed, snoozed_until,
                            terminal, due_date, status, advisories)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            notes = excluded.notes,
            list_name = excluded.list_name,
            interval_count = excluded.interval_count,
            interval_unit = excluded.interval_unit,
            anchor_mode = excluded.anchor_mode,
            season_mask = excluded.season_mask,
            initial_due = excluded.initial_due,
            cadence_step = excluded.cadence_step,
            last_completed = excluded.last_completed,
            snoozed_until = excluded.snoozed_until,
            terminal = excluded.terminal,
            due_date = excluded.due_date,
            status = excluded.status,
            advisories = excluded.advisories,
            updated_at = datetime('now')",
        params![
            task.id,
            task.title,
            task.notes,
            task.list,
            interval_count,
            interval_unit,
            anchor_mode,
            task.window.map(|w| i64::from(w.mask())),
            fmt_date(task.initial_due),
            task.cadence_step.map(i64::from),
            task.last_completed.map(fmt_date),
            task.snoozed_until.map(fmt_date),
            task.terminal,
            task.due_date.map(fmt_date),
            task.status.as_str(),
            advisories.join(","),
        ],
    )?;

    conn.execute("DELETE FROM completions WHERE task_id = ?1", params![task.id])?;
    for (seq, c) in task.history.iter().enumerate() {
        conn.execute(
            "INSERT INTO completions (task_id, seq, completed_on, due_on) VALUES (?1, ?2, ?3, ?4)",
            params![task.id, seq as i64, fmt_date(c.completed_on), c.due_on.map(fmt_date)],
        )?;
    }
    debug!(task_id = %task.id, status = task.status.as_str(), "task saved");
    Ok(())
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<(), UpkeepError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(UpkeepError::task_not_found(id));
    }
    Ok(())
}

pub fn get_completions(conn: &Connection, task_id: &str) -> Result<Vec<Completion>, UpkeepError> {
    let mut stmt = conn.prepare(
        "SELECT completed_on, due_on FROM completions WHERE task_id = ?1 ORDER BY seq ASC",
    )?;
    let raw = stmt
        .query_map(params![task_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    raw.into_iter()
        .map(|(completed_on, due_on)| {
            Ok(Completion {
                completed_on: parse_date(&completed_on)?,
                due_on: parse_opt_date(due_on.as_deref())?,
            })
        })
        .collect()
}

/// Resolve a task reference: exact ID → ID prefix → title substring.
pub fn resolve_task(conn: &Connection, reference: &str) -> Result<Task, UpkeepError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UpkeepError::validation("Task reference must not be empty"));
    }

    // 1. Exact ID
    let upper = reference.to_ascii_uppercase();
    if let Ok(task) = get_task_by_id(conn, &upper) {
        return Ok(task);
    }

    // 2. ID prefix
    let ids = matching_ids(
        conn,
        "SELECT id, title FROM tasks WHERE id LIKE ?1 ESCAPE '\\'",
        &format!("{}%", escape_like(&upper)),
    )?;
    if let Some(task) = pick_one(conn, reference, ids)? {
        return Ok(task);
    }

    // 3. Title substring (case-insensitive for ASCII)
    let ids = matching_ids(
        conn,
        "SELECT id, title FROM tasks WHERE title LIKE ?1 ESCAPE '\\'",
        &format!("%{}%", escape_like(reference)),
    )?;
    match pick_one(conn, reference, ids)? {
        Some(task) => Ok(task),
        None => Err(UpkeepError::task_not_found(reference)),
    }
}

fn matching_ids(conn: &Connection, sql: &str, pattern: &str) -> Result<Vec<(String, String)>, UpkeepError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![pattern], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(String, String)>, _>>()?;
    Ok(rows)
}

fn pick_one(
    conn: &Connection,
    reference: &str,
    matches: Vec<(String, String)>,
) -> Result<Option<Task>, UpkeepError> {
    match matches.as_slice() {
        [] => Ok(None),
        [(id, _)] => get_task_by_id(conn, id).map(Some),
        many => {
            let candidates: Vec<String> = many
                .iter()
                .map(|(id, title)| format!("{title} ({id})"))
                .collect();
            Err(UpkeepError::ambiguous_ref(reference, &candidates))
        }
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory;
    use crate::engine::{FixedClock, TaskManager};
    use crate::error::ErrorCode;
    use crate::models::NewTask;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_save_and_load_full_task() {
        let conn = open_in_memory().unwrap();
        let mut manager = TaskManager::new(SqliteStore::new(&conn), FixedClock(d(2024, 5, 1)));
        let created = manager
            .create(
                NewTask::new(
                    "Service boiler",
                    RecurrencePolicy::recurring(Interval::years(1).unwrap(), AnchorMode::FromDueDate),
                    d(2024, 9, 15),
                )
                .with_window(SeasonalWindow::range(4, 10).unwrap())
                .with_notes("Book engineer in advance")
                .with_list("Utilities"),
            )
            .unwrap();
        let done = manager.complete(&created.id, d(2024, 9, 20)).unwrap();

        let loaded = get_task_by_id(&conn, &created.id).unwrap();
        assert_eq!(loaded, done);
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.due_date, Some(d(2025, 9, 15)));
    }

    #[test]
    fn test_resolve_by_prefix_and_title() {
        let conn = open_in_memory().unwrap();
        let mut manager = TaskManager::new(SqliteStore::new(&conn), FixedClock(d(2024, 5, 1)));
        let gutters = manager
            .create(NewTask::new("Clean gutters", RecurrencePolicy::NonRecurring, d(2024, 6, 1)))
            .unwrap();
        manager
            .create(NewTask::new("Clean oven", RecurrencePolicy::NonRecurring, d(2024, 6, 2)))
            .unwrap();

        assert_eq!(resolve_task(&conn, &gutters.id).unwrap().id, gutters.id);
        assert_eq!(resolve_task(&conn, &gutters.id.to_lowercase()).unwrap().id, gutters.id);
        assert_eq!(resolve_task(&conn, "gutters").unwrap().id, gutters.id);

        let err = resolve_task(&conn, "clean").unwrap_err();
        assert_eq!(err.code, ErrorCode::AmbiguousRef);
        let err = resolve_task(&conn, "windows").unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }

    #[test]
    fn test_delete_cascades_history() {
        let conn = open_in_memory().unwrap();
        let mut manager = TaskManager::new(SqliteStore::new(&conn), FixedClock(d(2024, 5, 1)));
        let t = manager
            .create(NewTask::new(
                "Water plants",
                RecurrencePolicy::recurring(Interval::days(3).unwrap(), AnchorMode::FromCompletion),
                d(2024, 5, 1),
            ))
            .unwrap();
        manager.complete(&t.id, d(2024, 5, 1)).unwrap();
        manager.delete(&t.id).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
        assert_eq!(delete_task(&conn, &t.id).unwrap_err().code, ErrorCode::TaskNotFound);
    }
}
