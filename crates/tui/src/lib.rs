//! Terminal editor for Gantt project timelines
//!
//! Shows the task list next to the timeline bars of the active
//! initiative and edits the schedule from the keyboard, saving changes in
//! the background.

pub mod app;
pub mod details;
pub mod error;
pub mod event;
pub mod navigation;
pub mod timeline;
pub mod ui;

pub use app::App;
pub use error::{TuiError, TuiResult};
pub use event::{Action, action_for};
