//! Snapshot stores.
//!
//! A store saves and loads whole [`Snapshot`] documents. The editor talks to
//! one store; [`CompositeStore`] combines the embedded document store with
//! a local file so either can carry the data when the other is missing.

mod composite;
mod file;
mod memory;
mod surreal;

pub use composite::CompositeStore;
pub use file::{LocalFileStore, SNAPSHOT_FILE_NAME};
pub use memory::MemoryStore;
pub use surreal::{DOCUMENT_TABLE, DocumentStore};

use std::future::Future;

use tracing::warn;

use crate::config::StorageConfig;
use crate::error::GanttResult;
use crate::snapshot::Snapshot;

/// A place that can hold one project snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Short backend name for logs and status lines.
    fn name(&self) -> &str;

    /// Whether the backend is reachable right now.
    fn probe(&self) -> impl Future<Output = bool> + Send;

    /// Load the stored snapshot, `None` if nothing was saved yet.
    fn load(&self) -> impl Future<Output = GanttResult<Option<Snapshot>>> + Send;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &Snapshot) -> impl Future<Output = GanttResult<()>> + Send;
}

/// The store used by the command line and the terminal editor.
pub type ProjectStore = CompositeStore<DocumentStore, LocalFileStore>;

/// Open the project store described by `config`.
///
/// The local file is always used. The document store is skipped with
/// `local_only`; if it cannot be opened the failure is logged and the
/// local file carries on alone.
pub async fn open_project_store(config: &StorageConfig) -> ProjectStore {
    let fallback = LocalFileStore::new(&config.project_dir());
    if config.local_only {
        return CompositeStore::open(None, fallback).await;
    }

    let primary = match DocumentStore::connect(&config.document_store_path(), &config.project).await
    {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Document store unavailable, using local file only: {}", e.full_message());
            None
        }
    };
    CompositeStore::open(primary, fallback).await
}
