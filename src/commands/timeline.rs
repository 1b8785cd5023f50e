//! Timeline command for drawing the chart as text
//!
//! Implements the `gantt timeline` command: the visible rows with their
//! bars, the zoom header, and the today marker.

use chrono::NaiveDate;
use clap::Args;
use gantt_core::{GanttResult, GanttState, offset_of};

use crate::output::format_timeline;

/// Draw the timeline as text
#[derive(Debug, Args)]
pub struct TimelineCommand {
    /// First date shown (defaults to the earliest visible task, or today)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Width of the chart area in columns
    #[arg(short, long, default_value_t = 80)]
    pub columns: usize,
}

impl TimelineCommand {
    /// Execute the timeline command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` or `GanttError::InvalidGeometry`
    /// if the layout cannot be built.
    pub fn execute(&self, state: &GanttState) -> GanttResult<String> {
        let layout = state.layout()?;
        let from = self
            .from
            .or_else(|| layout.rows.iter().map(|r| r.task.start_date).min())
            .unwrap_or_else(|| state.today())
            .clamp(layout.bounds.start, layout.bounds.end);
        let from_px = offset_of(from, layout.bounds.start, layout.day_width)?;

        let initiative = state
            .current_initiative()
            .map_or(state.current_initiative_id(), |i| i.name.as_str());
        Ok(format!(
            "{} | zoom: {} | {} .. {}\n\n{}",
            initiative,
            layout.zoom,
            layout.bounds.start,
            layout.bounds.end,
            format_timeline(&layout, from_px, self.columns)
        ))
    }
}
