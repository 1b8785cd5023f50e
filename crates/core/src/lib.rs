//! Timeline scheduling engine for the Gantt project editor
//!
//! Provides the task model, date/pixel geometry, zoom profiles, timeline
//! bounds fitting, hierarchical visibility, the mutation engine, and
//! snapshot persistence with debounced saving.

pub mod autosave;
pub mod bounds;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod session;
pub mod snapshot;
pub mod tree;
pub mod view;
pub mod zoom;

pub use autosave::{AutoSaver, DEFAULT_SAVE_DELAY, SaveOutcome};
pub use bounds::{TimelineBounds, compute_bounds};
pub use config::StorageConfig;
pub use engine::{DEFAULT_INITIATIVE_ID, DEFAULT_INITIATIVE_NAME, GanttState};
pub use error::{GanttError, GanttResult};
pub use geometry::{BarGeometry, MILESTONE_MARKER_WIDTH, bar_geometry, date_at_offset, offset_of};
pub use layout::{RowLayout, TimelineLayout};
pub use models::{Initiative, Task, TaskDraft, TaskPatch, TaskType};
pub use persistence::{
    CompositeStore, DocumentStore, LocalFileStore, MemoryStore, ProjectStore, SnapshotStore,
    open_project_store,
};
pub use session::{LoadSource, load_or_sample};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, sample_snapshot};
pub use tree::{TaskTree, VisibleTask};
pub use view::ViewState;
pub use zoom::{HeaderCell, ZoomLevel};
