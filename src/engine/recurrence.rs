use chrono::{Days, Months, NaiveDate};

use crate::error::UpkeepError;
use crate::models::{AnchorMode, Interval, IntervalUnit, RecurrencePolicy};

/// A fixed cadence: its first due date and the index of an occurrence on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub origin: NaiveDate,
    pub step: u32,
}

impl Cadence {
    pub fn at(origin: NaiveDate) -> Self {
        Self { origin, step: 0 }
    }
}

/// The dates a next occurrence can be measured from.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub completed: NaiveDate,
    pub due: Cadence,
}

/// `date + times × interval`, calendar-aware.
///
/// Months and years are added as one calendar step and clamp to the last
/// valid day of the target month (Jan 31 + 1 month = Feb 28/29), so repeated
/// multiples of the same origin never drift.
pub fn advance(date: NaiveDate, interval: &Interval, times: u32) -> NaiveDate {
    let n = interval.count.saturating_mul(times);
    let result = match interval.unit {
        IntervalUnit::Day => date.checked_add_days(Days::new(u64::from(n))),
        IntervalUnit::Week => date.checked_add_days(Days::new(u64::from(n) * 7)),
        IntervalUnit::Month => date.checked_add_months(Months::new(n)),
        IntervalUnit::Year => date.checked_add_months(Months::new(n.saturating_mul(12))),
    };
    result.unwrap_or(NaiveDate::MAX)
}

/// Next candidate due date, ignoring seasonality.
pub fn next_due(policy: &RecurrencePolicy, anchor: &Anchor) -> Result<NaiveDate, UpkeepError> {
    match policy {
        RecurrencePolicy::NonRecurring => Err(UpkeepError::no_next_occurrence()),
        RecurrencePolicy::Recurring {
            interval,
            anchor: AnchorMode::FromCompletion,
        } => Ok(advance(anchor.completed, interval, 1)),
        RecurrencePolicy::Recurring {
            interval,
            anchor: AnchorMode::FromDueDate,
        } => Ok(advance(
            anchor.due.origin,
            interval,
            anchor.due.step.saturating_add(1),
        )),
    }
}

/// First step after `cadence.step` whose date is strictly after `floor`.
///
/// Used when an occurrence was pushed forward by its seasonal window: the
/// occurrences it swallowed are skipped rather than replayed.
pub fn first_step_after(cadence: Cadence, interval: &Interval, floor: NaiveDate) -> u32 {
    let mut step = cadence.step.saturating_add(1);
    while step < u32::MAX && advance(cadence.origin, interval, step) <= floor {
        step += 1;
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn anchor(completed: NaiveDate, due: NaiveDate) -> Anchor {
        Anchor {
            completed,
            due: Cadence::at(due),
        }
    }

    #[test]
    fn test_non_recurring_has_no_next() {
        let err = next_due(&RecurrencePolicy::NonRecurring, &anchor(d(2024, 1, 1), d(2024, 1, 1)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoNextOccurrence);
    }

    #[test]
    fn test_from_completion_uses_completion_date() {
        let policy = RecurrencePolicy::recurring(Interval::weeks(4).unwrap(), AnchorMode::FromCompletion);
        let next = next_due(&policy, &anchor(d(2024, 1, 8), d(2024, 1, 1))).unwrap();
        assert_eq!(next, d(2024, 2, 5));
    }

    #[test]
    fn test_from_due_date_ignores_completion() {
        let policy = RecurrencePolicy::recurring(Interval::weeks(4).unwrap(), AnchorMode::FromDueDate);
        let late = next_due(&policy, &anchor(d(2024, 1, 8), d(2024, 1, 1))).unwrap();
        let early = next_due(&policy, &anchor(d(2023, 12, 20), d(2024, 1, 1))).unwrap();
        assert_eq!(late, d(2024, 1, 29));
        assert_eq!(early, d(2024, 1, 29));
    }

    #[test]
    fn test_month_end_clamps() {
        let monthly = Interval::months(1).unwrap();
        assert_eq!(advance(d(2024, 1, 31), &monthly, 1), d(2024, 2, 29));
        assert_eq!(advance(d(2023, 1, 31), &monthly, 1), d(2023, 2, 28));
        let yearly = Interval::years(1).unwrap();
        assert_eq!(advance(d(2024, 2, 29), &yearly, 1), d(2025, 2, 28));
    }

    #[test]
    fn test_cadence_does_not_drift_after_clamping() {
        let monthly = Interval::months(1).unwrap();
        let origin = d(2024, 1, 31);
        let dates: Vec<_> = (1..=3).map(|k| advance(origin, &monthly, k)).collect();
        assert_eq!(dates, vec![d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]);
    }

    #[test]
    fn test_first_step_after_skips_swallowed_occurrences() {
        let monthly = Interval::months(1).unwrap();
        let cadence = Cadence::at(d(2024, 11, 15));
        // Nov 15 was pushed to Apr 1; Dec..Mar are skipped, Apr 15 is next.
        let step = first_step_after(cadence, &monthly, d(2025, 4, 1));
        assert_eq!(step, 5);
        assert_eq!(advance(cadence.origin, &monthly, step), d(2025, 4, 15));
    }
}
