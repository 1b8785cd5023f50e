//! Test infrastructure for integration tests
//!
//! Provides an isolated project directory per test and helpers to run
//! commands against a state that is saved and reloaded like the binary
//! does between invocations.

use std::path::PathBuf;

use chrono::NaiveDate;
use gantt_cli::commands::{AddCommand, Command};
use gantt_core::{
    GanttResult, GanttState, ProjectStore, Snapshot, SnapshotStore, StorageConfig, load_or_sample,
    open_project_store,
};

/// Test context containing an isolated data directory
pub struct TestContext {
    pub temp_dir: PathBuf,
    pub store: ProjectStore,
    pub today: NaiveDate,
}

impl TestContext {
    /// Create a new test context with a local-only store.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub async fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "gantt-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let config = StorageConfig {
            local_only: true,
            ..StorageConfig::at(&temp_dir)
        };
        let store = open_project_store(&config).await;

        Self {
            temp_dir,
            store,
            today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    /// Load the project the way the binary does.
    pub async fn load(&self) -> GanttState {
        load_or_sample(&self.store, self.today).await.unwrap().0
    }

    /// Load, run one command, and save unless it only reads.
    pub async fn run(&self, command: &Command) -> GanttResult<String> {
        let mut state = self.load().await;
        let output = command.execute(&mut state)?;
        if !command.is_read_only() {
            self.store.save(&Snapshot::capture(&state)).await?;
        }
        Ok(output)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        // Auto-cleanup on drop
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

/// Create an AddCommand with default optional fields filled in.
pub fn add_cmd(name: &str) -> AddCommand {
    AddCommand {
        name: name.to_string(),
        start: None,
        end: None,
        days: None,
        task_type: None,
        parent: None,
        progress: None,
        depends_on: vec![],
        resources: vec![],
        color: None,
    }
}

/// Create an AddCommand with parent.
#[allow(dead_code)]
pub fn add_cmd_with_parent(name: &str, parent: &str) -> AddCommand {
    AddCommand {
        parent: Some(parent.to_string()),
        ..add_cmd(name)
    }
}
