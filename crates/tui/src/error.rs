//! Error types for the terminal editor.

use std::io;

use gantt_core::GanttError;
use thiserror::Error;

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, TuiError>;

/// Error type for TUI operations.
#[derive(Debug, Error)]
pub enum TuiError {
    /// Failed to initialize, draw to, or restore the terminal.
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    /// The engine or a store rejected an operation.
    #[error(transparent)]
    Gantt(#[from] GanttError),
}

impl TuiError {
    /// Message for the exit line, with store details expanded.
    pub fn full_message(&self) -> String {
        match self {
            TuiError::Gantt(err) => err.full_message(),
            other => other.to_string(),
        }
    }
}
