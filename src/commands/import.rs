//! Import command for replacing the project with a document
//!
//! Implements the `gantt import` command. Older documents without
//! initiatives are migrated while loading.

use std::path::PathBuf;

use clap::Args;
use gantt_core::{GanttError, GanttResult, GanttState, Snapshot};
use tracing::info;

/// Replace the project with a JSON document
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Path to the JSON document
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Result of the import command
#[derive(Debug)]
pub struct ImportResult {
    pub tasks: usize,
    pub initiatives: usize,
    /// Whether the document predated initiatives
    pub migrated: bool,
    pub source: String,
}

impl std::fmt::Display for ImportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Import complete!")?;
        writeln!(f, "  Tasks: {}", self.tasks)?;
        writeln!(f, "  Initiatives: {}", self.initiatives)?;
        if self.migrated {
            writeln!(f, "  Migrated from a document without initiatives")?;
        }
        write!(f, "  Source: {}", self.source)
    }
}

impl ImportCommand {
    /// Execute the import command.
    ///
    /// The current state is only replaced once the whole document has been
    /// read and restored.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Io` if the file cannot be read,
    /// `GanttError::Encoding` for malformed JSON, and the restore errors
    /// (`CycleDetected`, `Validation`) for an inconsistent document.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<ImportResult> {
        let raw = std::fs::read_to_string(&self.input).map_err(|e| GanttError::Io {
            path: self.input.clone(),
            source: e,
        })?;

        let mut snapshot: Snapshot = serde_json::from_str(&raw)?;
        let migrated = snapshot.is_legacy();
        snapshot.migrate();
        let restored = snapshot.restore(state.today())?;

        info!(
            "Imported {} tasks from {}",
            restored.tasks().len(),
            self.input.display()
        );
        let result = ImportResult {
            tasks: restored.tasks().len(),
            initiatives: restored.initiatives().len(),
            migrated,
            source: self.input.display().to_string(),
        };
        *state = restored;
        Ok(result)
    }
}
