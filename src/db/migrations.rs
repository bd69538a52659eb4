use rusqlite::Connection;

use crate::error::UpkeepError;

pub fn run_migrations(conn: &Connection) -> Result<(), UpkeepError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            notes TEXT,
            list_name TEXT,
            interval_count INTEGER CHECK (interval_count IS NULL OR interval_count > 0),
            interval_unit TEXT
                CHECK (interval_unit IS NULL OR interval_unit IN ('day', 'week', 'month', 'year')),
            anchor_mode TEXT
                CHECK (anchor_mode IS NULL OR anchor_mode IN ('completion', 'due')),
            season_mask INTEGER CHECK (season_mask IS NULL OR (season_mask > 0 AND season_mask < 4096)),
            initial_due TEXT NOT NULL,
            cadence_step INTEGER,
            last_completed TEXT,
            snoozed_until TEXT,
            terminal INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming'
                CHECK (status IN ('upcoming', 'due', 'overdue', 'snoozed', 'completed')),
            advisories TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS completions (
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            seq INTEGER NOT NULL,
            completed_on TEXT NOT NULL,
            due_on TEXT,
            PRIMARY KEY (task_id, seq)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_tasks_due ON tasks(due_date);
        CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_name);
        ",
    )?;
    Ok(())
}
