use chrono::{Datelike, NaiveDate};
use upkeep::db::{connection, SqliteStore};
use upkeep::models::{
    Advisory, AnchorMode, Interval, NewTask, RecurrencePolicy, SeasonalWindow, Task, TaskPatch,
    TaskStatus,
};
use upkeep::{evaluate, ErrorCode, FixedClock, MemoryStore, TaskManager};

// ─── helpers ───────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn on(store: &mut MemoryStore, today: NaiveDate) -> TaskManager<&mut MemoryStore, FixedClock> {
    TaskManager::new(store, FixedClock(today))
}

fn every(interval: Interval, anchor: AnchorMode) -> RecurrencePolicy {
    RecurrencePolicy::recurring(interval, anchor)
}

fn create(store: &mut MemoryStore, today: NaiveDate, new: NewTask) -> Task {
    on(store, today).create(new).unwrap()
}

fn complete(store: &mut MemoryStore, id: &str, day: NaiveDate) -> Task {
    on(store, day).complete(id, day).unwrap()
}

// ─── worked scenarios ──────────────────────────────────────────────

#[test]
fn test_four_weekly_from_completion_counts_from_done_date() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::weeks(4).unwrap(), AnchorMode::FromCompletion);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Clean gutters", policy, d(2024, 1, 1)));

    let task = complete(&mut store, &task.id, d(2024, 1, 8));
    assert_eq!(task.due_date, Some(d(2024, 2, 5)));
    assert_eq!(task.status, TaskStatus::Upcoming);
    assert_eq!(task.last_completed, Some(d(2024, 1, 8)));
}

#[test]
fn test_four_weekly_from_due_date_keeps_cadence() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::weeks(4).unwrap(), AnchorMode::FromDueDate);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Change HVAC filter", policy, d(2024, 1, 1)));

    let task = complete(&mut store, &task.id, d(2024, 1, 8));
    assert_eq!(task.due_date, Some(d(2024, 1, 29)));
}

#[test]
fn test_monthly_pushed_to_start_of_season() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::months(1).unwrap(), AnchorMode::FromCompletion);
    let new = NewTask::new("Mow lawn", policy, d(2024, 10, 15))
        .with_window(SeasonalWindow::range(4, 10).unwrap());
    let task = create(&mut store, d(2024, 10, 1), new);

    let task = complete(&mut store, &task.id, d(2024, 10, 15));
    assert_eq!(task.due_date, Some(d(2025, 4, 1)));

    let before_natural = evaluate(&task, d(2024, 11, 10));
    assert_eq!(before_natural.natural_due, Some(d(2024, 11, 15)));
    assert!(before_natural.advisories.is_empty());

    let after_natural = evaluate(&task, d(2024, 11, 20));
    assert_eq!(after_natural.status, TaskStatus::Upcoming);
    assert_eq!(after_natural.advisories, vec![Advisory::SeasonallyBlocked]);
}

#[test]
fn test_one_off_completes_once() {
    let mut store = MemoryStore::new();
    let task = create(
        &mut store,
        d(2024, 2, 1),
        NewTask::new("Replace smoke detector battery", RecurrencePolicy::NonRecurring, d(2024, 3, 1)),
    );

    let done = complete(&mut store, &task.id, d(2024, 3, 2));
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.due_date, None);

    let err = on(&mut store, d(2024, 3, 3)).complete(&task.id, d(2024, 3, 3)).unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyCompleted);

    let later = evaluate(&done, d(2030, 1, 1));
    assert_eq!(later.status, TaskStatus::Completed);
    assert_eq!(later.due_date, None);
    assert!(later.advisories.is_empty());
}

#[test]
fn test_winter_task_closing_then_blocked() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::years(1).unwrap(), AnchorMode::FromDueDate);
    let new = NewTask::new("Service snow blower", policy, d(2025, 2, 20))
        .with_window(SeasonalWindow::range(12, 2).unwrap());
    let task = create(&mut store, d(2025, 1, 1), new);

    let late_feb = evaluate(&task, d(2025, 2, 25));
    assert_eq!(late_feb.status, TaskStatus::Overdue);
    assert_eq!(late_feb.advisories, vec![Advisory::ClosingSoon]);

    let march = evaluate(&task, d(2025, 3, 1));
    assert_eq!(march.status, TaskStatus::Overdue);
    assert_eq!(march.due_date, Some(d(2025, 2, 20)));
    assert_eq!(march.advisories, vec![Advisory::SeasonallyBlocked]);
}

// ─── properties ────────────────────────────────────────────────────

#[test]
fn test_evaluation_is_idempotent() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::days(10).unwrap(), AnchorMode::FromCompletion);
    let new = NewTask::new("Water orchids", policy, d(2024, 6, 1))
        .with_window(SeasonalWindow::range(5, 9).unwrap());
    let task = create(&mut store, d(2024, 5, 20), new);

    for today in [d(2024, 5, 1), d(2024, 6, 1), d(2024, 9, 28), d(2024, 12, 1)] {
        assert_eq!(evaluate(&task, today), evaluate(&task, today));
    }

    let mgr = on(&mut store, d(2024, 6, 5));
    assert_eq!(mgr.get(&task.id).unwrap(), mgr.get(&task.id).unwrap());
}

#[test]
fn test_later_completion_never_gives_earlier_due() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::months(1).unwrap(), AnchorMode::FromCompletion);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Descale kettle", policy, d(2024, 1, 31)));

    let mut previous: Option<NaiveDate> = None;
    for day in [d(2024, 1, 28), d(2024, 1, 30), d(2024, 1, 31), d(2024, 2, 1), d(2024, 2, 29)] {
        let mut scratch = store.clone();
        let next = complete(&mut scratch, &task.id, day).due_date.unwrap();
        if let Some(prev) = previous {
            assert!(next >= prev, "completion on {day} gave {next}, earlier than {prev}");
        }
        previous = Some(next);
    }
}

#[test]
fn test_fixed_cadence_does_not_drift_at_month_end() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::months(1).unwrap(), AnchorMode::FromDueDate);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Pay HOA dues", policy, d(2024, 1, 31)));

    let t = complete(&mut store, &task.id, d(2024, 2, 10));
    assert_eq!(t.due_date, Some(d(2024, 2, 29)));
    let t = complete(&mut store, &task.id, d(2024, 3, 20));
    assert_eq!(t.due_date, Some(d(2024, 3, 31)));
    let t = complete(&mut store, &task.id, d(2024, 3, 25));
    assert_eq!(t.due_date, Some(d(2024, 4, 30)));
}

#[test]
fn test_due_dates_stay_in_season() {
    let window = SeasonalWindow::range(4, 10).unwrap();
    let policy = every(Interval::weeks(3).unwrap(), AnchorMode::FromCompletion);

    for month in 1..=12 {
        let mut store = MemoryStore::new();
        let start = d(2024, month, 10);
        let new = NewTask::new("Fertilize beds", policy, start).with_window(window);
        let task = create(&mut store, start, new);
        let due = task.due_date.unwrap();
        assert!(window.contains(due.month()), "created in {month}: due {due}");

        let task = complete(&mut store, &task.id, due);
        let due = task.due_date.unwrap();
        assert!(window.contains(due.month()), "completed {start}: next due {due}");
    }
}

#[test]
fn test_snooze_hides_without_moving_due_date() {
    let mut store = MemoryStore::new();
    let task = create(
        &mut store,
        d(2024, 5, 1),
        NewTask::new("Flush water heater", RecurrencePolicy::NonRecurring, d(2024, 5, 10)),
    );

    let snoozed = on(&mut store, d(2024, 5, 12)).snooze(&task.id, d(2024, 5, 20)).unwrap();
    assert_eq!(snoozed.status, TaskStatus::Snoozed);
    assert_eq!(snoozed.due_date, Some(d(2024, 5, 10)));

    let woke = evaluate(&snoozed, d(2024, 5, 20));
    assert_eq!(woke.status, TaskStatus::Overdue);
    assert_eq!(woke.due_date, Some(d(2024, 5, 10)));
}

#[test]
fn test_expired_snooze_matches_never_snoozed_twin() {
    let mut snoozed = MemoryStore::new();
    let policy = every(Interval::months(1).unwrap(), AnchorMode::FromDueDate);
    let new = NewTask::new("Clean pool filter", policy, d(2024, 9, 15))
        .with_window(SeasonalWindow::range(4, 10).unwrap());
    let task = create(&mut snoozed, d(2024, 9, 1), new);
    let mut plain = snoozed.clone();

    let hidden = on(&mut snoozed, d(2024, 9, 16)).snooze(&task.id, d(2024, 9, 25)).unwrap();
    assert_eq!(hidden.status, TaskStatus::Snoozed);

    let a = on(&mut snoozed, d(2024, 9, 25)).get(&task.id).unwrap();
    let b = on(&mut plain, d(2024, 9, 25)).get(&task.id).unwrap();
    for today in [d(2024, 9, 25), d(2024, 10, 1), d(2024, 10, 28)] {
        assert_eq!(evaluate(&a, today), evaluate(&b, today), "on {today}");
    }

    let a = complete(&mut snoozed, &task.id, d(2024, 9, 26));
    let b = complete(&mut plain, &task.id, d(2024, 9, 26));
    assert_eq!(a, b);
    assert_eq!(a.due_date, Some(d(2024, 10, 15)));

    let a = complete(&mut snoozed, &task.id, d(2024, 10, 16));
    let b = complete(&mut plain, &task.id, d(2024, 10, 16));
    assert_eq!(a, b);
    assert_eq!(a.due_date, Some(d(2025, 4, 1)));
    for today in [d(2024, 11, 20), d(2025, 4, 1), d(2025, 4, 2)] {
        let (ea, eb) = (evaluate(&a, today), evaluate(&b, today));
        assert_eq!((ea.due_date, ea.status, &ea.advisories), (eb.due_date, eb.status, &eb.advisories));
    }
}

#[test]
fn test_completion_clears_snooze() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::weeks(1).unwrap(), AnchorMode::FromCompletion);
    let task = create(&mut store, d(2024, 5, 1), NewTask::new("Take out recycling", policy, d(2024, 5, 3)));

    on(&mut store, d(2024, 5, 1)).snooze(&task.id, d(2024, 5, 10)).unwrap();
    let done = complete(&mut store, &task.id, d(2024, 5, 4));
    assert_eq!(done.snoozed_until, None);
    assert_eq!(done.due_date, Some(d(2024, 5, 11)));
    assert_eq!(done.status, TaskStatus::Upcoming);
}

#[test]
fn test_policy_edit_keeps_history() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::weeks(2).unwrap(), AnchorMode::FromDueDate);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Clean fridge coils", policy, d(2024, 1, 1)));
    complete(&mut store, &task.id, d(2024, 1, 2));
    complete(&mut store, &task.id, d(2024, 1, 16));

    let patch = TaskPatch {
        policy: Some(every(Interval::weeks(4).unwrap(), AnchorMode::FromDueDate)),
        ..TaskPatch::default()
    };
    let edited = on(&mut store, d(2024, 1, 20)).edit(&task.id, patch).unwrap();
    assert_eq!(edited.history.len(), 2);
    assert_eq!(edited.history[0].due_on, Some(d(2024, 1, 1)));
    assert_eq!(edited.history[1].due_on, Some(d(2024, 1, 15)));
    // four weeks from the Jan 15 occurrence last done
    assert_eq!(edited.due_date, Some(d(2024, 2, 12)));

    let next = complete(&mut store, &task.id, d(2024, 2, 12));
    assert_eq!(next.due_date, Some(d(2024, 3, 11)));
}

#[test]
fn test_interval_edit_applies_from_anchor_in_both_modes() {
    for anchor in [AnchorMode::FromCompletion, AnchorMode::FromDueDate] {
        let mut store = MemoryStore::new();
        let yearly = every(Interval::years(1).unwrap(), anchor);
        let task = create(&mut store, d(2024, 1, 1), NewTask::new("Check attic", yearly, d(2024, 1, 1)));
        let done = complete(&mut store, &task.id, d(2024, 1, 1));
        assert_eq!(done.due_date, Some(d(2025, 1, 1)), "{anchor:?}");

        let patch = TaskPatch {
            policy: Some(every(Interval::months(1).unwrap(), anchor)),
            ..TaskPatch::default()
        };
        let edited = on(&mut store, d(2024, 1, 10)).edit(&task.id, patch).unwrap();
        assert_eq!(edited.due_date, Some(d(2024, 2, 1)), "{anchor:?}");

        let next = complete(&mut store, &task.id, d(2024, 2, 1));
        assert_eq!(next.due_date, Some(d(2024, 3, 1)), "{anchor:?}");
    }
}

#[test]
fn test_anchor_switch_measures_from_last_completion() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::weeks(4).unwrap(), AnchorMode::FromCompletion);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Clean gutters", policy, d(2024, 1, 1)));
    complete(&mut store, &task.id, d(2024, 1, 8));

    let patch = TaskPatch {
        policy: Some(every(Interval::weeks(2).unwrap(), AnchorMode::FromDueDate)),
        ..TaskPatch::default()
    };
    let edited = on(&mut store, d(2024, 1, 10)).edit(&task.id, patch).unwrap();
    assert_eq!(edited.due_date, Some(d(2024, 1, 22)));

    // fixed cadence from here on, however late
    let next = complete(&mut store, &task.id, d(2024, 1, 30));
    assert_eq!(next.due_date, Some(d(2024, 2, 5)));
}

#[test]
fn test_edit_before_first_completion_keeps_first_due() {
    let mut store = MemoryStore::new();
    let policy = every(Interval::years(1).unwrap(), AnchorMode::FromDueDate);
    let task = create(&mut store, d(2024, 1, 1), NewTask::new("Sweep chimney", policy, d(2024, 9, 1)));

    let patch = TaskPatch {
        policy: Some(every(Interval::months(6).unwrap(), AnchorMode::FromDueDate)),
        ..TaskPatch::default()
    };
    let edited = on(&mut store, d(2024, 1, 2)).edit(&task.id, patch).unwrap();
    assert_eq!(edited.due_date, Some(d(2024, 9, 1)));
    assert_eq!(complete(&mut store, &task.id, d(2024, 9, 1)).due_date, Some(d(2025, 3, 1)));
}

#[test]
fn test_invalid_interval_is_rejected_on_create() {
    let err = "0w".parse::<Interval>().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPolicy);

    let mut store = MemoryStore::new();
    let bad = RecurrencePolicy::Recurring {
        interval: Interval {
            count: 0,
            unit: upkeep::models::IntervalUnit::Day,
        },
        anchor: AnchorMode::FromCompletion,
    };
    let err = on(&mut store, d(2024, 1, 1))
        .create(NewTask::new("Never", bad, d(2024, 1, 1)))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPolicy);
    assert!(store.is_empty());
}

// ─── sqlite-backed store ───────────────────────────────────────────

#[test]
fn test_sqlite_store_round_trips_through_lifecycle() {
    let conn = connection::open_in_memory().unwrap();
    let policy = every(Interval::months(3).unwrap(), AnchorMode::FromDueDate);
    let new = NewTask::new("Test sump pump", policy, d(2024, 3, 15))
        .with_window(SeasonalWindow::range(3, 11).unwrap())
        .with_list("Basement");

    let id = {
        let mut mgr = TaskManager::new(SqliteStore::new(&conn), FixedClock(d(2024, 3, 1)));
        mgr.create(new).unwrap().id
    };

    let mut mgr = TaskManager::new(SqliteStore::new(&conn), FixedClock(d(2024, 3, 20)));
    let done = mgr.complete(&id, d(2024, 3, 20)).unwrap();
    assert_eq!(done.due_date, Some(d(2024, 6, 15)));

    let loaded = mgr.get(&id).unwrap();
    assert_eq!(loaded, done);
    assert_eq!(loaded.list.as_deref(), Some("Basement"));
    assert_eq!(loaded.history.len(), 1);
}
