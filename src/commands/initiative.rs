//! Initiative commands
//!
//! Implements `gantt initiative {list,add,switch,rename,delete}`. An
//! initiative groups top-level projects; exactly one is active and the
//! other commands work inside it.

use clap::Subcommand;
use gantt_core::{GanttResult, GanttState};

use crate::output::format_initiative_table;

/// Manage initiatives
#[derive(Debug, Subcommand)]
pub enum InitiativeCommand {
    /// List initiatives, marking the active one
    List,
    /// Create an initiative
    Add {
        /// Name of the initiative
        name: String,
        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Make the new initiative active
        #[arg(long)]
        switch: bool,
    },
    /// Make an initiative active
    Switch {
        /// Initiative ID
        id: String,
    },
    /// Rename an initiative or change its description
    Rename {
        /// Initiative ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete an initiative and its tasks
    Delete {
        /// Initiative ID
        id: String,
    },
}

impl InitiativeCommand {
    /// Whether the command only reads.
    pub fn is_read_only(&self) -> bool {
        matches!(self, InitiativeCommand::List)
    }

    /// Execute the initiative command.
    ///
    /// # Arguments
    ///
    /// * `state` - The loaded editor state
    ///
    /// # Errors
    ///
    /// Returns `GanttError` if:
    /// - The initiative does not exist
    /// - A name is empty
    /// - The last initiative would be deleted
    pub fn execute(&self, state: &mut GanttState) -> GanttResult<String> {
        match self {
            InitiativeCommand::List => Ok(format_initiative_table(
                state.initiatives(),
                state.current_initiative_id(),
            )),
            InitiativeCommand::Add {
                name,
                description,
                switch,
            } => {
                let initiative = state.create_initiative(name, description)?;
                let mut message = format!("Created initiative: {} ({})", initiative.id, initiative.name);
                if *switch {
                    state.switch_initiative(&initiative.id)?;
                    message.push_str("\nSwitched to the new initiative");
                }
                Ok(message)
            }
            InitiativeCommand::Switch { id } => {
                state.switch_initiative(id)?;
                let name = state
                    .current_initiative()
                    .map_or(id.as_str(), |i| i.name.as_str());
                Ok(format!("Switched to initiative: {} ({})", id, name))
            }
            InitiativeCommand::Rename {
                id,
                name,
                description,
            } => {
                let initiative =
                    state.update_initiative(id, name.as_deref(), description.as_deref())?;
                Ok(format!("Updated initiative: {} ({})", initiative.id, initiative.name))
            }
            InitiativeCommand::Delete { id } => {
                let removed = state.delete_initiative(id)?;
                Ok(format!(
                    "Deleted initiative: {} with {} task(s)\nActive initiative: {}",
                    id,
                    removed.len(),
                    state.current_initiative_id()
                ))
            }
        }
    }
}
