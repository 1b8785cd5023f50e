//! Snapshot stored as a JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::SnapshotStore;
use crate::error::{GanttError, GanttResult};
use crate::snapshot::Snapshot;

/// File name of the snapshot inside the project directory
pub const SNAPSHOT_FILE_NAME: &str = "gantt-chart-data.json";

/// A snapshot kept in `<dir>/gantt-chart-data.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so
/// a crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    /// Store the snapshot file inside `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SNAPSHOT_FILE_NAME),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    async fn ensure_parent(&self) -> GanttResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GanttError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(LocalFileStore: Send, Sync);

impl SnapshotStore for LocalFileStore {
    fn name(&self) -> &str {
        "local-file"
    }

    async fn probe(&self) -> bool {
        self.ensure_parent().await.is_ok()
    }

    async fn load(&self) -> GanttResult<Option<Snapshot>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(GanttError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        debug!("Loaded snapshot file: {}", self.path.display());
        Snapshot::from_json(&raw).map(Some)
    }

    async fn save(&self, snapshot: &Snapshot) -> GanttResult<()> {
        let json = snapshot.to_json()?;
        self.ensure_parent().await?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| GanttError::Io {
                path: temp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| GanttError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        debug!("Saved snapshot file: {}", self.path.display());
        Ok(())
    }
}
