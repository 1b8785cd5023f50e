//! Move command for rescheduling a task by date
//!
//! Implements the `gantt move` command, the date-based twin of a bar drag.

use chrono::NaiveDate;
use clap::Args;
use gantt_core::{GanttResult, GanttState, Task};

/// Move a task to a new start date and duration
#[derive(Debug, Args)]
pub struct MoveCommand {
    /// Task ID to move
    #[arg(required = true)]
    pub id: String,

    /// New first day (YYYY-MM-DD)
    #[arg(required = true)]
    pub start: NaiveDate,

    /// New length in days (defaults to the current duration)
    #[arg(short, long)]
    pub days: Option<i64>,
}

/// Result of a move or drag
#[derive(Debug)]
pub struct MoveResult {
    pub task: Task,
}

impl std::fmt::Display for MoveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Moved task: {} to {} .. {} ({} days)",
            self.task.id, self.task.start_date, self.task.end_date, self.task.duration
        )
    }
}

impl MoveCommand {
    /// Execute the move command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if:
    /// - The task does not exist
    /// - The task is a milestone (`NotDraggable`)
    /// - The duration is below one day
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<MoveResult> {
        let days = match self.days {
            Some(days) => days,
            None => state.task(&self.id).map_or(1, |t| t.duration.max(1)),
        };
        let task = state.reposition_by_drag(&self.id, self.start, days)?;
        Ok(MoveResult { task })
    }
}
