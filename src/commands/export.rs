//! Export command for writing the project document
//!
//! Implements the `gantt export` command. The output is the same JSON
//! document the stores keep, so it can be imported again.

use std::path::PathBuf;

use clap::Args;
use gantt_core::{GanttError, GanttResult, GanttState, Snapshot};
use tracing::debug;

/// Write the project document as JSON
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Output file path (defaults to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    /// Execute the export command.
    ///
    /// Returns the document itself when printing to stdout, or a summary
    /// when writing to a file.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Encoding` if the document cannot be encoded and
    /// `GanttError::Io` if the file cannot be written.
    pub fn execute(&self, state: &GanttState) -> GanttResult<String> {
        let snapshot = Snapshot::capture(state);
        let json = snapshot.to_json()?;

        let Some(path) = &self.output else {
            return Ok(json);
        };
        debug!("Exporting {} tasks to {}", snapshot.tasks.len(), path.display());
        std::fs::write(path, json).map_err(|e| GanttError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(format!(
            "Export complete!\n  Tasks: {}\n  Initiatives: {}\n  Output: {}",
            snapshot.tasks.len(),
            snapshot.initiatives.len(),
            path.display()
        ))
    }
}
