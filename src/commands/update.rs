//! Update command for changing task fields
//!
//! Implements the `gantt update` command. Only the given fields change;
//! list options replace the stored list.

use chrono::NaiveDate;
use clap::Args;
use gantt_core::{GanttResult, GanttState, Task, TaskPatch, TaskType};

/// Change fields of a task
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Task ID to update
    #[arg(required = true)]
    pub id: String,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New first day (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<NaiveDate>,

    /// New last day (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: Option<NaiveDate>,

    /// New task type (summary, task, milestone)
    #[arg(short = 't', long = "type")]
    pub task_type: Option<TaskType>,

    /// New completion percent
    #[arg(long)]
    pub progress: Option<i64>,

    /// Move under this parent task
    #[arg(long, conflicts_with = "top_level")]
    pub parent: Option<String>,

    /// Move to the top level
    #[arg(long)]
    pub top_level: bool,

    /// Replace the dependencies (can be specified multiple times)
    #[arg(long = "depends-on", conflicts_with = "clear_dependencies")]
    pub depends_on: Vec<String>,

    /// Remove all dependencies
    #[arg(long)]
    pub clear_dependencies: bool,

    /// Replace the resources (can be specified multiple times)
    #[arg(short, long = "resource")]
    pub resources: Vec<String>,

    /// New bar color
    #[arg(long)]
    pub color: Option<String>,
}

/// Result of the update command
#[derive(Debug)]
pub struct UpdateResult {
    pub task: Task,
    /// Whether any field was given
    pub changed: bool,
}

impl std::fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.changed {
            write!(f, "Updated task: {} ({})", self.task.id, self.task.name)
        } else {
            write!(f, "No changes specified for task: {}", self.task.id)
        }
    }
}

impl UpdateCommand {
    fn patch(&self) -> TaskPatch {
        let mut patch = TaskPatch::new();
        if let Some(name) = &self.name {
            patch = patch.with_name(name.as_str());
        }
        if let Some(start) = self.start {
            patch = patch.with_start(start);
        }
        if let Some(end) = self.end {
            patch = patch.with_end(end);
        }
        if let Some(task_type) = self.task_type {
            patch = patch.with_type(task_type);
        }
        if let Some(progress) = self.progress {
            patch = patch.with_progress(progress);
        }
        if let Some(parent) = &self.parent {
            patch = patch.with_parent(parent.as_str());
        } else if self.top_level {
            patch = patch.to_top_level();
        }
        if self.clear_dependencies {
            patch = patch.with_dependencies(Vec::new());
        } else if !self.depends_on.is_empty() {
            patch = patch.with_dependencies(self.depends_on.clone());
        }
        if !self.resources.is_empty() {
            patch = patch.with_resources(self.resources.clone());
        }
        if let Some(color) = &self.color {
            patch = patch.with_color(color.as_str());
        }
        patch
    }

    /// Execute the update command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if:
    /// - The task does not exist
    /// - The merged task is invalid (empty name, inverted dates)
    /// - The new parent does not exist or would create a cycle
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<UpdateResult> {
        let patch = self.patch();
        let changed = !patch.is_empty();
        let task = state.update(&self.id, patch)?;
        Ok(UpdateResult { task, changed })
    }
}
