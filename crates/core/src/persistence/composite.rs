//! Primary store with a local fallback.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::SnapshotStore;
use crate::error::GanttResult;
use crate::snapshot::Snapshot;

/// Writes to an optional primary store and always to a fallback.
///
/// The primary is probed when the composite opens and again on
/// [`CompositeStore::reprobe`]. Saves go to both stores independently: a
/// primary failure is logged, a fallback failure is returned. Loads prefer
/// the primary and fall back when it is unavailable, empty, or failing.
pub struct CompositeStore<P, F> {
    primary: Option<P>,
    fallback: F,
    primary_available: AtomicBool,
}

impl<P: SnapshotStore, F: SnapshotStore> CompositeStore<P, F> {
    /// Combine the stores and probe the primary.
    pub async fn open(primary: Option<P>, fallback: F) -> Self {
        let store = Self {
            primary,
            fallback,
            primary_available: AtomicBool::new(false),
        };
        store.reprobe().await;
        store
    }

    /// Probe the primary again; returns whether it is available.
    pub async fn reprobe(&self) -> bool {
        let available = match &self.primary {
            Some(primary) => primary.probe().await,
            None => false,
        };
        let previous = self.primary_available.swap(available, Ordering::SeqCst);
        if previous != available {
            info!("Primary store available: {}", available);
        }
        available
    }

    /// Whether the last probe found the primary reachable.
    pub fn primary_available(&self) -> bool {
        self.primary_available.load(Ordering::SeqCst)
    }

    pub fn primary(&self) -> Option<&P> {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    fn active_primary(&self) -> Option<&P> {
        self.primary.as_ref().filter(|_| self.primary_available())
    }
}

impl<P: SnapshotStore, F: SnapshotStore> SnapshotStore for CompositeStore<P, F> {
    fn name(&self) -> &str {
        match self.active_primary() {
            Some(primary) => primary.name(),
            None => self.fallback.name(),
        }
    }

    async fn probe(&self) -> bool {
        self.reprobe().await || self.fallback.probe().await
    }

    async fn load(&self) -> GanttResult<Option<Snapshot>> {
        if let Some(primary) = self.active_primary() {
            match primary.load().await {
                Ok(Some(snapshot)) => {
                    debug!("Loaded snapshot from {}", primary.name());
                    return Ok(Some(snapshot));
                }
                Ok(None) => debug!("{} has no snapshot, trying {}", primary.name(), self.fallback.name()),
                Err(e) => warn!(
                    "Loading from {} failed, trying {}: {}",
                    primary.name(),
                    self.fallback.name(),
                    e.full_message()
                ),
            }
        }
        self.fallback.load().await
    }

    async fn save(&self, snapshot: &Snapshot) -> GanttResult<()> {
        if let Some(primary) = self.active_primary()
            && let Err(e) = primary.save(snapshot).await
        {
            warn!("Saving to {} failed: {}", primary.name(), e.full_message());
        }
        self.fallback.save(snapshot).await
    }
}
