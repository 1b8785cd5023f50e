//! Drag command for applying a dropped bar
//!
//! Implements the `gantt drag` command: the bar's left edge and width in
//! pixels, measured at the current zoom from the timeline start, become a
//! new start date and duration.

use clap::Args;
use gantt_core::{GanttResult, GanttState};

use super::reschedule::MoveResult;

/// Apply a dropped bar position in pixels
#[derive(Debug, Args)]
pub struct DragCommand {
    /// Task ID of the dragged bar
    #[arg(required = true)]
    pub id: String,

    /// Left edge in pixels from the timeline start
    #[arg(required = true, allow_negative_numbers = true)]
    pub left: i64,

    /// Bar width in pixels (defaults to the current width)
    #[arg(short, long)]
    pub width: Option<i64>,
}

impl DragCommand {
    /// Execute the drag command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if the task does not exist, is a milestone, or
    /// the geometry cannot be converted.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<MoveResult> {
        let width = match self.width {
            Some(width) => width,
            None => state
                .task(&self.id)
                .map_or(0, |t| t.duration * state.zoom().day_width()),
        };
        let task = state.apply_drag(&self.id, self.left, width)?;
        Ok(MoveResult { task })
    }
}
