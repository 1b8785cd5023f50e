//! Storage configuration.
//!
//! Where the project lives on disk and which project to open. Values come
//! from an explicit argument, then the environment, then the defaults.

use std::path::{Path, PathBuf};

use crate::error::{GanttError, GanttResult};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "GANTT_DATA_DIR";

/// Environment variable selecting the project
pub const PROJECT_ENV: &str = "GANTT_PROJECT";

/// Project opened when none is given
pub const DEFAULT_PROJECT: &str = "default";

/// Directory name under the platform data directory
pub const APP_DIR_NAME: &str = "gantt";

/// Data directory used when the platform has none
pub const FALLBACK_DATA_DIR: &str = ".gantt";

/// Subdirectory holding the embedded document store
pub const DOCUMENT_STORE_DIR: &str = "store";

/// Resolved storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root directory for all stored data.
    pub data_dir: PathBuf,
    /// Project key; selects the document and the snapshot file directory.
    pub project: String,
    /// Skip the document store and use the local file only.
    pub local_only: bool,
}

impl StorageConfig {
    /// Resolve the configuration.
    ///
    /// Priority for each value:
    /// 1. The explicit argument
    /// 2. The environment variable (if set and non-empty)
    /// 3. The default
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Validation` if the project name is not a plain
    /// identifier.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        project: Option<String>,
        local_only: bool,
    ) -> GanttResult<Self> {
        let data_dir = data_dir
            .or_else(|| non_empty_env(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let project = project
            .or_else(|| non_empty_env(PROJECT_ENV))
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        validate_project(&project)?;

        Ok(Self {
            data_dir,
            project,
            local_only,
        })
    }

    /// Configuration rooted at `data_dir` with the default project.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            project: DEFAULT_PROJECT.to_string(),
            local_only: false,
        }
    }

    /// Directory holding this project's snapshot file.
    pub fn project_dir(&self) -> PathBuf {
        self.data_dir.join(&self.project)
    }

    /// Directory of the embedded document store.
    pub fn document_store_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_STORE_DIR)
    }

    /// Path of a log file in the data directory.
    pub fn log_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Platform data directory for the app, or `./.gantt` without one.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn validate_project(project: &str) -> GanttResult<()> {
    let valid = !project.is_empty()
        && project
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(GanttError::validation(format!(
            "invalid project '{}'. Use letters, digits, '-' or '_'",
            project
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Run `f` with `name` set to `value` (or removed), restoring it after.
    fn with_env<T>(name: &str, value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let original = env::var(name).ok();
        // SAFETY: Tests touching the environment are serialized
        unsafe {
            match value {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
        let result = f();
        // SAFETY: Tests touching the environment are serialized
        unsafe {
            match original {
                Some(v) => env::set_var(name, v),
                None => env::remove_var(name),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn test_explicit_arguments_take_priority() {
        let config = with_env(DATA_DIR_ENV, Some("/env/path"), || {
            StorageConfig::resolve(Some("/cli/path".into()), Some("alpha".into()), true).unwrap()
        });
        assert_eq!(config.data_dir, PathBuf::from("/cli/path"));
        assert_eq!(config.project, "alpha");
        assert!(config.local_only);
    }

    #[test]
    #[serial]
    fn test_env_takes_priority_over_default() {
        let config = with_env(DATA_DIR_ENV, Some("/env/path"), || {
            with_env(PROJECT_ENV, Some("beta"), || {
                StorageConfig::resolve(None, None, false).unwrap()
            })
        });
        assert_eq!(config.data_dir, PathBuf::from("/env/path"));
        assert_eq!(config.project, "beta");
    }

    #[test]
    #[serial]
    fn test_empty_env_uses_default() {
        let config = with_env(DATA_DIR_ENV, Some(""), || {
            with_env(PROJECT_ENV, None, || StorageConfig::resolve(None, None, false).unwrap())
        });
        assert_eq!(config.data_dir, default_data_dir());
        assert_eq!(config.project, DEFAULT_PROJECT);
    }

    #[test]
    fn test_invalid_project_rejected() {
        let result = StorageConfig::resolve(Some("/tmp".into()), Some("../escape".into()), false);
        assert!(matches!(result, Err(GanttError::Validation { .. })));
    }

    #[test]
    fn test_derived_paths() {
        let config = StorageConfig::at("/data");
        assert_eq!(config.project_dir(), PathBuf::from("/data/default"));
        assert_eq!(config.document_store_path(), PathBuf::from("/data/store"));
        assert_eq!(config.log_path("tui.log"), PathBuf::from("/data/tui.log"));
    }

    #[test]
    fn test_default_data_dir_ends_with_app_name() {
        let dir = default_data_dir();
        assert!(dir.ends_with(APP_DIR_NAME) || dir == PathBuf::from(FALLBACK_DATA_DIR));
    }
}
