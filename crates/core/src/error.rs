use std::path::PathBuf;
use thiserror::Error;

/// Error types for the Gantt scheduling engine and its stores
#[derive(Error, Debug)]
pub enum GanttError {
    /// Bad user input (empty name, inverted date range, out-of-range values)
    #[error("{message}")]
    Validation { message: String },

    /// A referenced task or initiative does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// Milestones have a fixed zero-duration marker and cannot be dragged
    #[error("Task '{task_id}' is a milestone and cannot be dragged")]
    NotDraggable { task_id: String },

    /// The last remaining initiative cannot be removed
    #[error("Cannot delete initiative '{initiative_id}': at least one initiative must exist")]
    LastInitiative { initiative_id: String },

    /// Date/pixel conversion was asked to work with unusable inputs
    #[error("Invalid timeline geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// The parent graph contains (or would contain) a loop
    #[error("Parent cycle detected at task '{task_id}'")]
    CycleDetected { task_id: String },

    /// Error reading or writing a snapshot file
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error creating the data directory
    #[error("Failed to create data directory at {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error opening the document store
    #[error("Failed to open document store at {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: Box<surrealdb::Error>,
    },

    /// Error executing a document store query
    #[error("Document store query failed")]
    Store(#[source] Box<surrealdb::Error>),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The store was probed unavailable
    #[error("Persistence backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

impl From<surrealdb::Error> for GanttError {
    fn from(err: surrealdb::Error) -> Self {
        GanttError::Store(Box::new(err))
    }
}

impl GanttError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        GanttError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a missing task.
    pub fn task_not_found(id: impl Into<String>) -> Self {
        GanttError::NotFound {
            kind: "Task",
            id: id.into(),
        }
    }

    /// Shorthand for a missing initiative.
    pub fn initiative_not_found(id: impl Into<String>) -> Self {
        GanttError::NotFound {
            kind: "Initiative",
            id: id.into(),
        }
    }

    /// Shorthand for a geometry failure.
    pub fn geometry(reason: impl Into<String>) -> Self {
        GanttError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Whether this error came from a save/load path.
    ///
    /// Persistence failures are non-fatal: the in-memory state stays
    /// authoritative.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            GanttError::Io { .. }
                | GanttError::CreateDirectory { .. }
                | GanttError::Connection { .. }
                | GanttError::Store(_)
                | GanttError::Encoding(_)
                | GanttError::Unavailable { .. }
        )
    }

    /// Whether this error signals corrupted data rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            GanttError::InvalidGeometry { .. } | GanttError::CycleDetected { .. }
        )
    }

    /// Get the full error message including the nested store error.
    pub fn full_message(&self) -> String {
        match self {
            GanttError::Store(err) => format!("Document store query failed: {}", err),
            other => other.to_string(),
        }
    }
}

/// Result type alias for engine operations
pub type GanttResult<T> = Result<T, GanttError>;
