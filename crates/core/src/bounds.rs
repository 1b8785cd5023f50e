//! Timeline bounds fitting.
//!
//! The visible window is seeded around today, widened to cover every
//! relevant task, padded, and finally clamped so today always sits
//! comfortably inside it.

use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::trace;

use crate::tree::TaskTree;
use crate::zoom::days_in_month;

/// Months before today where the seed window starts (aligned to day 1).
pub const SEED_MONTHS_BEFORE: u32 = 3;
/// Months after today where the seed window ends (aligned to month end).
pub const SEED_MONTHS_AFTER: u32 = 9;
/// Days added before the earliest date.
pub const LEADING_PADDING_DAYS: i64 = 14;
/// Days added after the latest date.
pub const TRAILING_PADDING_DAYS: i64 = 60;
/// The start is never later than this many months before today.
pub const MIN_MONTHS_BEFORE_TODAY: u32 = 1;
/// The end is never earlier than this many months after today.
pub const MIN_MONTHS_AFTER_TODAY: u32 = 3;

/// The `[start, end]` calendar window of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineBounds {
    /// Number of days between start and end.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `date` lies inside the window (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Scrollable width in pixels for the given day width.
    pub fn total_width(&self, day_width: i64) -> i64 {
        self.total_days().saturating_mul(day_width)
    }
}

/// Fit the timeline window to the tasks and today's date.
///
/// With an initiative filter, only tasks resolving to that initiative
/// (plus tasks with no resolvable initiative) widen the window.
///
/// Never fails: the result always satisfies `start < end` and
/// `start <= today <= end`.
pub fn compute_bounds(
    tree: &TaskTree,
    today: NaiveDate,
    initiative_filter: Option<&str>,
) -> TimelineBounds {
    // 1. Seed around today
    let mut min_date = first_of_month(months_before(today, SEED_MONTHS_BEFORE));
    let mut max_date = last_of_month(months_after(today, SEED_MONTHS_AFTER));

    // 2. Cover every relevant task
    for task in tree.tasks() {
        if let Some(filter) = initiative_filter {
            match tree.resolve_initiative(task) {
                Ok(Some(initiative)) if initiative != filter => continue,
                _ => {}
            }
        }
        min_date = min_date.min(task.start_date);
        max_date = max_date.max(task.end_date);
    }

    // 3. Asymmetric padding
    min_date = add_days(min_date, -LEADING_PADDING_DAYS);
    max_date = add_days(max_date, TRAILING_PADDING_DAYS);

    // 4. Keep today well inside
    min_date = min_date.min(months_before(today, MIN_MONTHS_BEFORE_TODAY));
    max_date = max_date.max(months_after(today, MIN_MONTHS_AFTER_TODAY));

    // 5. Degenerate window
    if min_date >= max_date {
        max_date = months_after(min_date, 12);
    }

    trace!(start = %min_date, end = %max_date, "Computed timeline bounds");
    TimelineBounds {
        start: min_date,
        end: max_date,
    }
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn months_after(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let fallback = if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    };
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(fallback)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date) as u32).unwrap_or(date)
}
