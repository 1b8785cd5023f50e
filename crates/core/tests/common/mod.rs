//! Test infrastructure for integration tests
//!
//! Provides isolated data directories that clean up after themselves.

use std::path::PathBuf;

use gantt_core::StorageConfig;

/// A uniquely named data directory under the system temp dir.
pub struct TestDir {
    pub path: PathBuf,
}

impl TestDir {
    /// Create a new isolated directory name.
    ///
    /// Uses process ID, thread ID, and nanosecond timestamp to guarantee
    /// isolation between parallel tests.
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "gantt-integration-{}-{}-{:?}-{}",
            name,
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        Self { path }
    }

    /// Storage configuration rooted at this directory.
    pub fn config(&self, local_only: bool) -> StorageConfig {
        StorageConfig {
            local_only,
            ..StorageConfig::at(&self.path)
        }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
