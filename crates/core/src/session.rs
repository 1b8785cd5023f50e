//! Opening an editor session from a store.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::engine::GanttState;
use crate::error::GanttResult;
use crate::persistence::SnapshotStore;

/// Where the session's state came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Restored from the store.
    Stored { backend: String },
    /// Nothing was stored; the demo project was used.
    Sample,
    /// Loading or restoring failed; the demo project was used.
    SampleAfterError { message: String },
}

impl LoadSource {
    /// A status-line description.
    pub fn describe(&self) -> String {
        match self {
            LoadSource::Stored { backend } => format!("Project data loaded from {}", backend),
            LoadSource::Sample => "No saved project, loaded sample data".to_string(),
            LoadSource::SampleAfterError { message } => {
                format!("Could not load saved project ({}), loaded sample data", message)
            }
        }
    }
}

/// Restore the stored project, or start from the demo project.
///
/// A failed load or an unusable document is not fatal: it is logged and
/// reported through [`LoadSource::SampleAfterError`].
///
/// # Errors
///
/// Only fails if the bundled demo project itself cannot be restored.
pub async fn load_or_sample<S: SnapshotStore>(
    store: &S,
    today: NaiveDate,
) -> GanttResult<(GanttState, LoadSource)> {
    let message = match store.load().await {
        Ok(Some(snapshot)) => match snapshot.restore(today) {
            Ok(state) => {
                info!("Loaded {} tasks from {}", state.tasks().len(), store.name());
                let source = LoadSource::Stored {
                    backend: store.name().to_string(),
                };
                return Ok((state, source));
            }
            Err(e) => e.full_message(),
        },
        Ok(None) => {
            info!("No stored project in {}, using sample data", store.name());
            return Ok((GanttState::sample(today)?, LoadSource::Sample));
        }
        Err(e) => e.full_message(),
    };

    warn!("Falling back to sample data: {}", message);
    Ok((
        GanttState::sample(today)?,
        LoadSource::SampleAfterError { message },
    ))
}
