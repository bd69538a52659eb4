//! Month-level eligibility checks against a task's seasonal window.
//!
//! `None` for the window means "no seasonal constraint": every month is
//! eligible and no date is ever moved.

use chrono::{Datelike, NaiveDate};

use crate::models::SeasonalWindow;

pub fn is_eligible(window: Option<&SeasonalWindow>, month: u32) -> bool {
    match window {
        None => true,
        Some(w) => w.contains(month),
    }
}

/// First eligible month scanning forward from `from_month` (inclusive),
/// wrapping December to January.
pub fn next_eligible_month(window: Option<&SeasonalWindow>, from_month: u32) -> u32 {
    let Some(w) = window else {
        return from_month;
    };
    let mut month = from_month;
    // A valid window has at least one eligible month, so 12 steps always suffice.
    for _ in 0..12 {
        if w.contains(month) {
            return month;
        }
        month = month % 12 + 1;
    }
    from_month
}

/// `from` itself when its month is eligible, otherwise the 1st of the next
/// eligible month after it.
pub fn next_eligible_date(window: Option<&SeasonalWindow>, from: NaiveDate) -> NaiveDate {
    if is_eligible(window, from.month()) {
        return from;
    }
    let (mut year, after) = if from.month() == 12 {
        (from.year() + 1, 1)
    } else {
        (from.year(), from.month() + 1)
    };
    let target = next_eligible_month(window, after);
    if target < after {
        year += 1;
    }
    NaiveDate::from_ymd_opt(year, target, 1).unwrap_or(from)
}

/// Last day of the run of consecutive eligible months containing `date`.
///
/// `None` when `date` is outside the window or the window covers the whole
/// year and therefore never closes.
pub fn window_close(window: Option<&SeasonalWindow>, date: NaiveDate) -> Option<NaiveDate> {
    let w = window?;
    if w.is_all_year() || !w.contains(date.month()) {
        return None;
    }
    let mut year = date.year();
    let mut month = date.month();
    loop {
        let next = month % 12 + 1;
        if !w.contains(next) {
            break;
        }
        if next == 1 {
            year += 1;
        }
        month = next;
    }
    last_day_of_month(year, month)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
