//! Render-ready layout of the timeline.
//!
//! Combines the visible rows, their bar geometry, the zoom header, and the
//! today marker into one value the surfaces can draw without touching the
//! engine rules.

use chrono::NaiveDate;

use crate::bounds::TimelineBounds;
use crate::error::GanttResult;
use crate::geometry::{BarGeometry, bar_geometry, offset_of};
use crate::models::Task;
use crate::tree::TaskTree;
use crate::view::ViewState;
use crate::zoom::{HeaderCell, ZoomLevel};

/// One row of the task list with its bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub task: Task,
    pub depth: usize,
    pub has_children: bool,
    pub is_collapsed: bool,
    pub is_selected: bool,
    pub bar: BarGeometry,
}

/// Everything needed to draw the chart for the active initiative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineLayout {
    pub bounds: TimelineBounds,
    pub zoom: ZoomLevel,
    pub day_width: i64,
    /// Scrollable width in pixels.
    pub total_width: i64,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RowLayout>,
    /// Pixel offset of the today marker.
    pub today_offset: i64,
}

impl TimelineLayout {
    /// Row index of a task, if visible.
    pub fn row_of(&self, task_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.task.id == task_id)
    }
}

/// Lay out the visible rows of `initiative`.
///
/// # Errors
///
/// Propagates `CycleDetected` from the traversal and `InvalidGeometry`
/// from the offset arithmetic.
pub fn build_layout(
    tree: &TaskTree,
    view: &ViewState,
    initiative: &str,
    bounds: TimelineBounds,
    today: NaiveDate,
) -> GanttResult<TimelineLayout> {
    let zoom = view.zoom();
    let day_width = zoom.day_width();

    let visible = tree.visible_tasks(view.collapsed(), Some(initiative))?;
    let mut rows = Vec::with_capacity(visible.len());
    for entry in visible {
        rows.push(RowLayout {
            bar: bar_geometry(entry.task, bounds.start, day_width)?,
            task: entry.task.clone(),
            depth: entry.depth,
            has_children: entry.has_children,
            is_collapsed: entry.is_collapsed,
            is_selected: view.selected() == Some(entry.task.id.as_str()),
        });
    }

    Ok(TimelineLayout {
        bounds,
        zoom,
        day_width,
        total_width: bounds.total_width(day_width),
        header: zoom.header_cells(&bounds)?,
        rows,
        today_offset: offset_of(today, bounds.start, day_width)?,
    })
}
