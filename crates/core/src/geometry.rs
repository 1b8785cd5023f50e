//! Date <-> pixel conversion for the timeline.
//!
//! All offsets are measured in pixels from the timeline origin date. A day
//! is `day_width` pixels wide; the zoom profile decides that width.

use chrono::{Duration, NaiveDate};

use crate::error::{GanttError, GanttResult};
use crate::models::Task;

/// Width in pixels of a milestone marker, independent of zoom.
pub const MILESTONE_MARKER_WIDTH: i64 = 16;

/// Horizontal placement of a task bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    /// Left edge in pixels from the timeline start.
    pub left: i64,
    /// Bar width in pixels.
    pub width: i64,
}

impl BarGeometry {
    /// Right edge in pixels (exclusive).
    pub fn right(&self) -> i64 {
        self.left + self.width
    }
}

fn check_day_width(day_width: i64) -> GanttResult<()> {
    if day_width <= 0 {
        return Err(GanttError::geometry(format!(
            "day width must be positive, got {}",
            day_width
        )));
    }
    Ok(())
}

/// Pixel offset of `date` relative to `timeline_start`.
///
/// Dates before the start produce negative offsets; clamping is left to
/// the renderer.
///
/// # Errors
///
/// Returns `GanttError::InvalidGeometry` for a non-positive day width or
/// when the offset does not fit in an `i64`.
pub fn offset_of(date: NaiveDate, timeline_start: NaiveDate, day_width: i64) -> GanttResult<i64> {
    check_day_width(day_width)?;
    let days = (date - timeline_start).num_days();
    days.checked_mul(day_width)
        .ok_or_else(|| GanttError::geometry(format!("offset of {} overflows", date)))
}

/// Calendar date under the pixel `offset`.
///
/// The offset is snapped to the nearest day boundary; exact halves round
/// toward the later day.
///
/// # Errors
///
/// Returns `GanttError::InvalidGeometry` for a non-positive day width or
/// when the resulting date is outside the supported calendar.
pub fn date_at_offset(
    offset: i64,
    timeline_start: NaiveDate,
    day_width: i64,
) -> GanttResult<NaiveDate> {
    check_day_width(day_width)?;
    let days = round_div(offset, day_width)
        .ok_or_else(|| GanttError::geometry(format!("offset {} overflows", offset)))?;
    let delta = Duration::try_days(days)
        .ok_or_else(|| GanttError::geometry(format!("{} days is out of range", days)))?;
    timeline_start
        .checked_add_signed(delta)
        .ok_or_else(|| GanttError::geometry(format!("offset {} leaves the calendar", offset)))
}

/// `round(n / d)` for positive `d`, with halves rounding up.
fn round_div(n: i64, d: i64) -> Option<i64> {
    let twice_n = n.checked_mul(2)?;
    let twice_d = d.checked_mul(2)?;
    Some((twice_n.checked_add(d)?).div_euclid(twice_d))
}

/// Pixel placement of a task bar.
///
/// Regular bars span their inclusive duration; milestones get a fixed
/// marker width.
pub fn bar_geometry(
    task: &Task,
    timeline_start: NaiveDate,
    day_width: i64,
) -> GanttResult<BarGeometry> {
    let left = offset_of(task.start_date, timeline_start, day_width)?;
    let width = if task.task_type.is_zero_width() {
        MILESTONE_MARKER_WIDTH
    } else {
        let days = task.task_type.duration_between(task.start_date, task.end_date).max(1);
        days.checked_mul(day_width)
            .ok_or_else(|| GanttError::geometry(format!("width of task {} overflows", task.id)))?
    };
    Ok(BarGeometry { left, width })
}

/// Start date and day count for a bar dropped at `left` with `width`.
///
/// The day count is at least one.
pub fn drag_result(
    left: i64,
    width: i64,
    timeline_start: NaiveDate,
    day_width: i64,
) -> GanttResult<(NaiveDate, i64)> {
    let start = date_at_offset(left, timeline_start, day_width)?;
    let days = round_div(width, day_width)
        .ok_or_else(|| GanttError::geometry(format!("width {} overflows", width)))?
        .max(1);
    Ok((start, days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========================================
    // offset_of / date_at_offset
    // ========================================

    #[test]
    fn test_offset_of_counts_whole_days() {
        let start = date(2025, 6, 1);
        assert_eq!(offset_of(start, start, 40).unwrap(), 0);
        assert_eq!(offset_of(date(2025, 6, 3), start, 40).unwrap(), 80);
        assert_eq!(offset_of(date(2025, 7, 1), start, 10).unwrap(), 300);
    }

    #[test]
    fn test_offset_before_start_is_negative() {
        let start = date(2025, 6, 10);
        assert_eq!(offset_of(date(2025, 6, 8), start, 20).unwrap(), -40);
    }

    #[test]
    fn test_zero_day_width_is_invalid_geometry() {
        let start = date(2025, 6, 1);
        assert!(matches!(
            offset_of(start, start, 0),
            Err(GanttError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            date_at_offset(40, start, -5),
            Err(GanttError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_date_at_offset_snaps_to_nearest_day() {
        let start = date(2025, 6, 1);
        assert_eq!(date_at_offset(80, start, 40).unwrap(), date(2025, 6, 3));
        assert_eq!(date_at_offset(59, start, 40).unwrap(), date(2025, 6, 2));
        assert_eq!(date_at_offset(19, start, 40).unwrap(), start);
        // Halves round toward the later day, also for negative offsets.
        assert_eq!(date_at_offset(20, start, 40).unwrap(), date(2025, 6, 2));
        assert_eq!(date_at_offset(-20, start, 40).unwrap(), start);
        assert_eq!(date_at_offset(-21, start, 40).unwrap(), date(2025, 5, 31));
    }

    #[test]
    fn test_date_at_offset_out_of_calendar() {
        let start = date(2025, 6, 1);
        assert!(matches!(
            date_at_offset(i64::MAX / 4, start, 1),
            Err(GanttError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_round_trip_examples() {
        let start = date(2024, 12, 30);
        for width in [10, 20, 40, 7] {
            for d in [date(2024, 12, 1), start, date(2025, 2, 28), date(2026, 3, 1)] {
                let offset = offset_of(d, start, width).unwrap();
                assert_eq!(date_at_offset(offset, start, width).unwrap(), d);
            }
        }
    }

    // ========================================
    // bar_geometry / drag_result
    // ========================================

    #[test]
    fn test_bar_geometry_spans_inclusive_duration() {
        let start = date(2025, 6, 1);
        let task = Task::new("t", "Build", date(2025, 6, 2), date(2025, 6, 4));
        let bar = bar_geometry(&task, start, 40).unwrap();
        assert_eq!(bar, BarGeometry { left: 40, width: 120 });
        assert_eq!(bar.right(), 160);
    }

    #[test]
    fn test_bar_geometry_milestone_marker() {
        let start = date(2025, 6, 1);
        let task = Task::new("m", "Ship", date(2025, 6, 5), date(2025, 6, 5))
            .with_type(TaskType::Milestone);
        let bar = bar_geometry(&task, start, 20).unwrap();
        assert_eq!(bar.left, 80);
        assert_eq!(bar.width, MILESTONE_MARKER_WIDTH);
    }

    #[test]
    fn test_drag_result_from_dropped_bar() {
        let start = date(2025, 6, 1);
        let (new_start, days) = drag_result(80, 120, start, 40).unwrap();
        assert_eq!(new_start, date(2025, 6, 3));
        assert_eq!(days, 3);
    }

    #[test]
    fn test_drag_result_minimum_one_day() {
        let start = date(2025, 6, 1);
        let (_, days) = drag_result(0, 5, start, 40).unwrap();
        assert_eq!(days, 1);
    }

    #[test]
    fn test_drag_bar_round_trip() {
        let start = date(2025, 5, 20);
        let task = Task::new("t", "Build", date(2025, 6, 2), date(2025, 6, 11));
        let bar = bar_geometry(&task, start, 20).unwrap();
        let (new_start, days) = drag_result(bar.left, bar.width, start, 20).unwrap();
        assert_eq!(new_start, task.start_date);
        assert_eq!(days, task.duration);
    }
}
