//! Delete command for removing tasks
//!
//! Implements the `gantt delete` command. Without `--cascade` the task's
//! children move to the top level; with it the whole subtree goes.

use clap::Args;
use gantt_core::{GanttResult, GanttState};

/// Delete a task
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Task ID to delete
    #[arg(required = true)]
    pub id: String,

    /// Also delete every descendant
    #[arg(long)]
    pub cascade: bool,
}

/// Result of the delete command
#[derive(Debug)]
pub struct DeleteResult {
    /// The task that was deleted
    pub id: String,
    /// Name of the deleted task
    pub name: String,
    /// Descendants deleted with it
    pub descendants: Vec<String>,
    /// Children moved to the top level
    pub promoted: Vec<String>,
}

impl std::fmt::Display for DeleteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Deleted task: {} ({})", self.id, self.name)?;
        if !self.descendants.is_empty() {
            write!(
                f,
                "\nAlso deleted {} descendant(s): {}",
                self.descendants.len(),
                self.descendants.join(", ")
            )?;
        }
        if !self.promoted.is_empty() {
            write!(
                f,
                "\nMoved {} child task(s) to the top level: {}",
                self.promoted.len(),
                self.promoted.join(", ")
            )?;
        }
        Ok(())
    }
}

impl DeleteCommand {
    /// Execute the delete command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` if the task does not exist.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<DeleteResult> {
        let name = state
            .task(&self.id)
            .map(|t| t.name.clone())
            .unwrap_or_default();

        if self.cascade {
            let mut removed = state.delete_cascade(&self.id)?;
            let descendants = removed.split_off(1);
            return Ok(DeleteResult {
                id: self.id.clone(),
                name,
                descendants,
                promoted: vec![],
            });
        }

        let promoted: Vec<String> = state
            .tree()
            .children(&self.id)
            .map(|t| t.id.clone())
            .collect();
        state.delete(&self.id)?;
        Ok(DeleteResult {
            id: self.id.clone(),
            name,
            descendants: vec![],
            promoted,
        })
    }
}
