//! Add command for creating new tasks
//!
//! Implements the `gantt add` command to create a task in the active
//! initiative, optionally as the child of another task.

use chrono::{Duration, NaiveDate};
use clap::Args;
use gantt_core::{GanttError, GanttResult, GanttState, Task, TaskDraft, TaskType};

/// Create a new task
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Name of the task
    #[arg(required = true)]
    pub name: String,

    /// First day of the task (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    pub start: Option<NaiveDate>,

    /// Last day of the task (YYYY-MM-DD, defaults to the start date)
    #[arg(short, long, conflicts_with = "days")]
    pub end: Option<NaiveDate>,

    /// Length in days, as an alternative to --end
    #[arg(long)]
    pub days: Option<i64>,

    /// Task type (summary, task, milestone)
    #[arg(short = 't', long = "type")]
    pub task_type: Option<TaskType>,

    /// Parent task ID (adds the task as a child)
    #[arg(long)]
    pub parent: Option<String>,

    /// Completion percent
    #[arg(long)]
    pub progress: Option<i64>,

    /// Dependency task ID (can be specified multiple times)
    #[arg(long = "depends-on")]
    pub depends_on: Vec<String>,

    /// Assigned resource (can be specified multiple times)
    #[arg(short, long = "resource")]
    pub resources: Vec<String>,

    /// Bar color (e.g. #4CAF50)
    #[arg(long)]
    pub color: Option<String>,
}

/// Result of the add command
#[derive(Debug)]
pub struct AddResult {
    pub task: Task,
}

impl std::fmt::Display for AddResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Created {}: {} ({}, {} to {})",
            self.task.task_type, self.task.id, self.task.name, self.task.start_date, self.task.end_date
        )
    }
}

impl AddCommand {
    /// Execute the add command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if:
    /// - The name is empty or the dates are inverted
    /// - `--days` is below one
    /// - The parent or a dependency does not exist
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<AddResult> {
        let start = self.start.unwrap_or_else(|| state.today());
        let end = match (self.end, self.days) {
            (Some(end), _) => end,
            (None, Some(days)) => end_after(start, days)?,
            (None, None) => start,
        };

        let mut draft = TaskDraft::new(self.name.as_str(), start, end);
        if let Some(task_type) = self.task_type {
            draft = draft.with_type(task_type);
        }
        if let Some(parent) = &self.parent {
            draft = draft.with_parent(parent.as_str());
        }
        if let Some(progress) = self.progress {
            draft = draft.with_progress(progress);
        }
        for dep in &self.depends_on {
            draft = draft.with_dependency(dep.as_str());
        }
        for resource in &self.resources {
            draft = draft.with_resource(resource.as_str());
        }
        if let Some(color) = &self.color {
            draft = draft.with_color(color.as_str());
        }

        let task = state.create(draft)?;
        Ok(AddResult { task })
    }
}

/// Last day of a span of `days` days starting at `start`.
pub(crate) fn end_after(start: NaiveDate, days: i64) -> GanttResult<NaiveDate> {
    if days < 1 {
        return Err(GanttError::validation(format!(
            "Duration must be at least one day, got {}",
            days
        )));
    }
    Duration::try_days(days - 1)
        .and_then(|span| start.checked_add_signed(span))
        .ok_or_else(|| GanttError::validation(format!("{} days from {} is out of range", days, start)))
}
