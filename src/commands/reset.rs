//! Reset command for discarding all data
//!
//! Implements the `gantt reset` command: the project goes back to the
//! bundled sample, or to an empty project with `--empty`.

use clap::Args;
use gantt_core::{GanttResult, GanttState};

/// Discard all data and restore the sample project
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Start from an empty project instead of the sample
    #[arg(long)]
    pub empty: bool,
}

impl ResetCommand {
    /// Execute the reset command.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled sample cannot be restored; the state
    /// is left unchanged in that case.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        if self.empty {
            *state = GanttState::new(state.today());
            return Ok("All data cleared".to_string());
        }
        state.clear_all()?;
        Ok(format!(
            "All data cleared, sample project restored ({} tasks)",
            state.tasks().len()
        ))
    }
}
