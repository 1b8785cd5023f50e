//! Debounced saving.
//!
//! Every mutation schedules a save of the latest snapshot. A burst of
//! mutations inside the delay window results in a single write of the
//! last snapshot. Results are reported on a channel so the surface can
//! show them; a failed save never touches the in-memory state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::GanttResult;
use crate::persistence::SnapshotStore;
use crate::snapshot::Snapshot;

/// Quiet period after the last change before saving
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(500);

/// Result of one save.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved { at: DateTime<Utc>, tasks: usize },
    Failed { message: String },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

struct Shared<S> {
    store: Arc<S>,
    /// Snapshot waiting for the timer.
    latest: Mutex<Option<Snapshot>>,
    /// Held for the duration of a write so writes land in order.
    write_lock: Mutex<()>,
    outcomes: UnboundedSender<SaveOutcome>,
}

impl<S: SnapshotStore + 'static> Shared<S> {
    async fn write(&self, snapshot: Snapshot) -> GanttResult<()> {
        let _guard = self.write_lock.lock().await;
        let tasks = snapshot.tasks.len();
        let result = self.store.save(&snapshot).await;
        let outcome = match &result {
            Ok(()) => {
                debug!("Saved {} tasks to {}", tasks, self.store.name());
                SaveOutcome::Saved {
                    at: Utc::now(),
                    tasks,
                }
            }
            Err(e) => {
                error!("Saving to {} failed: {}", self.store.name(), e.full_message());
                SaveOutcome::Failed {
                    message: e.full_message(),
                }
            }
        };
        // The receiver may be gone during shutdown
        let _ = self.outcomes.send(outcome);
        result
    }
}

/// Debounces snapshot saves onto a store.
pub struct AutoSaver<S> {
    shared: Arc<Shared<S>>,
    delay: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<S: SnapshotStore + 'static> AutoSaver<S> {
    /// Create a saver with the default delay and its outcome channel.
    pub fn new(store: Arc<S>) -> (Self, UnboundedReceiver<SaveOutcome>) {
        Self::with_delay(store, DEFAULT_SAVE_DELAY)
    }

    /// Create a saver with a custom delay.
    pub fn with_delay(store: Arc<S>, delay: Duration) -> (Self, UnboundedReceiver<SaveOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        let saver = Self {
            shared: Arc::new(Shared {
                store,
                latest: Mutex::new(None),
                write_lock: Mutex::new(()),
                outcomes,
            }),
            delay,
            timer: None,
        };
        (saver, receiver)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.shared.store
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a save is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Schedule `snapshot` to be saved after the delay.
    ///
    /// Replaces any snapshot still waiting and restarts the timer. Writes
    /// already in flight are not cancelled.
    pub async fn schedule(&mut self, snapshot: Snapshot) {
        *self.shared.latest.lock().await = Some(snapshot);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(snapshot) = shared.latest.lock().await.take() else {
                return;
            };
            // The write runs on its own task so a later abort of this
            // timer cannot interrupt it.
            tokio::spawn(async move {
                let _ = shared.write(snapshot).await;
            });
        }));
    }

    /// Save the waiting snapshot now.
    ///
    /// Waits for any write in flight. Does nothing if no snapshot is
    /// waiting.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub async fn flush(&mut self) -> GanttResult<()> {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let pending = self.shared.latest.lock().await.take();
        match pending {
            Some(snapshot) => self.shared.write(snapshot).await,
            None => {
                // Let an in-flight write finish before returning
                let _guard = self.shared.write_lock.lock().await;
                Ok(())
            }
        }
    }
}

impl<S> Drop for AutoSaver<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
