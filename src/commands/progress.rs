//! Progress and complete commands
//!
//! Implements `gantt progress` (set a percent, clamped to 0..=100) and
//! `gantt complete` (set 100).

use clap::Args;
use gantt_core::{GanttResult, GanttState, Task};

/// Set a task's progress
#[derive(Debug, Args)]
pub struct ProgressCommand {
    /// Task ID
    #[arg(required = true)]
    pub id: String,

    /// Completion percent (clamped to 0..=100)
    #[arg(required = true, allow_negative_numbers = true)]
    pub percent: i64,
}

/// Mark a task as complete
#[derive(Debug, Args)]
pub struct CompleteCommand {
    /// Task ID to complete
    #[arg(required = true)]
    pub id: String,
}

/// Result of a progress change
#[derive(Debug)]
pub struct ProgressResult {
    pub task: Task,
    /// Progress before the change
    pub previous: u8,
}

impl std::fmt::Display for ProgressResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.task.is_complete() && self.previous >= 100 {
            write!(f, "Task '{}' is already complete", self.task.id)
        } else if self.task.is_complete() {
            write!(f, "Completed task: {}", self.task.id)
        } else {
            write!(
                f,
                "Progress of task {}: {}% -> {}%",
                self.task.id, self.previous, self.task.progress
            )
        }
    }
}

fn previous_progress(state: &GanttState, id: &str) -> u8 {
    state.task(id).map_or(0, |t| t.progress)
}

impl ProgressCommand {
    /// Execute the progress command.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` if the task does not exist.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<ProgressResult> {
        let previous = previous_progress(state, &self.id);
        let task = state.set_progress(&self.id, self.percent)?;
        Ok(ProgressResult { task, previous })
    }
}

impl CompleteCommand {
    /// Execute the complete command.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` if the task does not exist.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<ProgressResult> {
        let previous = previous_progress(state, &self.id);
        let task = state.mark_complete(&self.id)?;
        Ok(ProgressResult { task, previous })
    }
}
