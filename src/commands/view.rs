//! View state commands
//!
//! Implements `gantt collapse`, `gantt zoom`, and `gantt select`. These
//! change only what is shown, never the tasks.

use clap::Args;
use gantt_core::{GanttResult, GanttState, ZoomLevel};

/// Toggle whether a task's children are hidden
#[derive(Debug, Args)]
pub struct CollapseCommand {
    /// Task ID to toggle
    #[arg(required = true)]
    pub id: String,
}

/// Set the timeline zoom level
#[derive(Debug, Args)]
pub struct ZoomCommand {
    /// Zoom level (day, week, month); cycles to the next level if omitted
    pub level: Option<ZoomLevel>,
}

/// Select a task, or clear the selection
#[derive(Debug, Args)]
pub struct SelectCommand {
    /// Task ID to select
    #[arg(required_unless_present = "clear")]
    pub id: Option<String>,

    /// Clear the selection
    #[arg(long, conflicts_with = "id")]
    pub clear: bool,
}

impl CollapseCommand {
    /// Execute the collapse command.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` if the task does not exist.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        let collapsed = state.toggle_collapse(&self.id)?;
        let verb = if collapsed { "Collapsed" } else { "Expanded" };
        Ok(format!("{} task: {}", verb, self.id))
    }
}

impl ZoomCommand {
    /// Execute the zoom command.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        let level = self.level.unwrap_or_else(|| state.zoom().cycle());
        state.set_zoom(level);
        Ok(format!(
            "Zoom: {} ({} px per day)",
            level,
            level.day_width()
        ))
    }
}

impl SelectCommand {
    /// Execute the select command.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` if the task does not exist.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        let id = if self.clear { None } else { self.id.as_deref() };
        state.select(id)?;
        Ok(match state.selected() {
            Some(task) => format!("Selected task: {} ({})", task.id, task.name),
            None => "Selection cleared".to_string(),
        })
    }
}
