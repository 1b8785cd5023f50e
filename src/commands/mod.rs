//! CLI commands for the Gantt editor
//!
//! Each subcommand runs against the loaded [`GanttState`]; the driver in
//! `main.rs` saves the state afterwards unless the command only reads.

pub mod add;
pub mod delete;
pub mod drag;
pub mod export;
pub mod import;
pub mod initiative;
pub mod list;
pub mod progress;
pub mod reschedule;
pub mod reset;
pub mod timeline;
pub mod update;
pub mod view;

pub use add::AddCommand;
pub use delete::DeleteCommand;
pub use drag::DragCommand;
pub use export::ExportCommand;
pub use import::ImportCommand;
pub use initiative::InitiativeCommand;
pub use list::ListCommand;
pub use progress::{CompleteCommand, ProgressCommand};
pub use reschedule::MoveCommand;
pub use reset::ResetCommand;
pub use timeline::TimelineCommand;
pub use update::UpdateCommand;
pub use view::{CollapseCommand, SelectCommand, ZoomCommand};

use clap::Subcommand;
use gantt_core::{GanttResult, GanttState};

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the visible tasks of the active initiative
    List(ListCommand),
    /// Create a new task
    Add(AddCommand),
    /// Change fields of a task
    Update(UpdateCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Move a task to a new start date and duration
    Move(MoveCommand),
    /// Apply a dropped bar position in pixels
    Drag(DragCommand),
    /// Set a task's progress
    Progress(ProgressCommand),
    /// Mark a task as complete
    Complete(CompleteCommand),
    /// Toggle whether a task's children are hidden
    Collapse(CollapseCommand),
    /// Show the children of every task
    ExpandAll,
    /// Hide the children of every summary task
    CollapseAll,
    /// Set the timeline zoom level
    Zoom(ZoomCommand),
    /// Select a task, or clear the selection
    Select(SelectCommand),
    /// Draw the timeline as text
    Timeline(TimelineCommand),
    /// Manage initiatives
    #[command(subcommand)]
    Initiative(InitiativeCommand),
    /// Write the project document as JSON
    Export(ExportCommand),
    /// Replace the project with a JSON document
    Import(ImportCommand),
    /// Discard all data and restore the sample project
    Reset(ResetCommand),
}

impl Command {
    /// Execute the command against the editor state.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if the command is rejected. The state is left
    /// unchanged in that case.
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        match self {
            Command::List(cmd) => cmd.execute(state),
            Command::Add(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Update(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Delete(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Move(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Drag(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Progress(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Complete(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Collapse(cmd) => cmd.execute(state),
            Command::ExpandAll => {
                state.expand_all();
                Ok("Expanded all tasks".to_string())
            }
            Command::CollapseAll => {
                state.collapse_all();
                Ok("Collapsed all summary tasks".to_string())
            }
            Command::Zoom(cmd) => cmd.execute(state),
            Command::Select(cmd) => cmd.execute(state),
            Command::Timeline(cmd) => cmd.execute(state),
            Command::Initiative(cmd) => cmd.execute(state),
            Command::Export(cmd) => cmd.execute(state),
            Command::Import(cmd) => cmd.execute(state).map(|r| r.to_string()),
            Command::Reset(cmd) => cmd.execute(state),
        }
    }

    /// Whether the command leaves the state untouched, so no save is needed.
    pub fn is_read_only(&self) -> bool {
        match self {
            Command::List(_) | Command::Timeline(_) | Command::Export(_) => true,
            Command::Initiative(cmd) => cmd.is_read_only(),
            _ => false,
        }
    }

    /// Whether the command discards the loaded tasks wholesale, so it may
    /// overwrite a stored document that failed to load.
    pub fn replaces_project(&self) -> bool {
        matches!(self, Command::Import(_) | Command::Reset(_))
    }
}
