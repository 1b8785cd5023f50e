//! List command for showing the task rows
//!
//! Implements the `gantt list` command: the visible rows of the active
//! initiative in tree order, as a table or as JSON.

use std::collections::HashSet;

use clap::Args;
use gantt_core::{GanttError, GanttResult, GanttState, VisibleTask};
use serde::Serialize;

use crate::output::format_task_table;

/// List the visible tasks of the active initiative
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Include the children of collapsed tasks
    #[arg(short, long)]
    pub all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One listed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub start: String,
    pub end: String,
    pub duration: i64,
    pub progress: u8,
    pub depth: usize,
    pub has_children: bool,
    pub collapsed: bool,
    pub selected: bool,
}

impl TaskSummary {
    fn from_row(row: &VisibleTask<'_>, selected: Option<&str>) -> Self {
        let task = row.task;
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            task_type: task.task_type.to_string(),
            start: task.start_date.to_string(),
            end: task.end_date.to_string(),
            duration: task.duration,
            progress: task.progress,
            depth: row.depth,
            has_children: row.has_children,
            collapsed: row.is_collapsed,
            selected: selected == Some(task.id.as_str()),
        }
    }
}

impl ListCommand {
    /// Collect the listed rows.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if the hierarchy loops.
    pub fn summaries(&self, state: &GanttState) -> GanttResult<Vec<TaskSummary>> {
        let selected = state.view().selected();
        let rows = if self.all {
            state
                .tree()
                .visible_tasks(&HashSet::new(), Some(state.current_initiative_id()))?
        } else {
            state.visible_tasks()?
        };
        Ok(rows
            .iter()
            .map(|row| TaskSummary::from_row(row, selected))
            .collect())
    }

    /// Execute the list command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if the hierarchy loops, or
    /// `GanttError::Encoding` if the JSON output cannot be produced.
    pub fn execute(&self, state: &GanttState) -> GanttResult<String> {
        let summaries = self.summaries(state)?;
        if self.json {
            return serde_json::to_string_pretty(&summaries).map_err(GanttError::from);
        }

        let heading = match state.current_initiative() {
            Some(initiative) => format!("Initiative: {}\n\n", initiative.name),
            None => String::new(),
        };
        Ok(format!("{}{}", heading, format_task_table(&summaries)))
    }
}
