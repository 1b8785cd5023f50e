//! In-process snapshot store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Mutex;

use super::SnapshotStore;
use crate::error::{GanttError, GanttResult};
use crate::snapshot::Snapshot;

/// Keeps the encoded document in memory.
///
/// Used for ephemeral sessions and tests. It can be switched into a
/// failing mode where every operation reports the backend unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Encoding` if the snapshot cannot be encoded.
    pub fn with_snapshot(snapshot: &Snapshot) -> GanttResult<Self> {
        Ok(Self {
            document: Mutex::new(Some(snapshot.to_json()?)),
            ..Self::default()
        })
    }

    /// Make every following operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> GanttResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GanttError::Unavailable {
                backend: self.name().to_string(),
            });
        }
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn probe(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }

    async fn load(&self) -> GanttResult<Option<Snapshot>> {
        self.check()?;
        let document = self.document.lock().await;
        document.as_deref().map(Snapshot::from_json).transpose()
    }

    async fn save(&self, snapshot: &Snapshot) -> GanttResult<()> {
        self.check()?;
        let json = snapshot.to_json()?;
        *self.document.lock().await = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
