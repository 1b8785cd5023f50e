//! The persisted project document.
//!
//! A snapshot is the whole editor state as one JSON document: the tasks,
//! the initiatives, and the view state. The same document is used by every
//! store and by import/export.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{DEFAULT_INITIATIVE_ID, DEFAULT_INITIATIVE_NAME, GanttState};
use crate::error::GanttResult;
use crate::models::{Initiative, Task, TaskType};
use crate::view::ViewState;
use crate::zoom::ZoomLevel;

/// Document version written by this crate.
pub const SNAPSHOT_VERSION: &str = "2.0";

const SAMPLE_PROJECT: &str = include_str!("../data/sample_project.json");

/// Serialized editor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub initiatives: Vec<Initiative>,
    #[serde(default)]
    pub current_initiative_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub collapsed_tasks: Vec<String>,
    #[serde(default)]
    pub current_zoom: ZoomLevel,
    #[serde(default)]
    pub selected_task: Option<String>,
}

impl Snapshot {
    /// Capture the current state, stamped with the current time.
    pub fn capture(state: &GanttState) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            last_saved: Some(Utc::now()),
            initiatives: state.initiatives().to_vec(),
            current_initiative_id: Some(state.current_initiative_id().to_string()),
            tasks: state.tasks().to_vec(),
            collapsed_tasks: state.view().collapsed_sorted(),
            current_zoom: state.zoom(),
            selected_task: state.view().selected().map(str::to_string),
        }
    }

    /// Parse a document, migrating older layouts.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Encoding` for malformed JSON.
    pub fn from_json(raw: &str) -> GanttResult<Self> {
        let mut snapshot: Snapshot = serde_json::from_str(raw)?;
        snapshot.migrate();
        Ok(snapshot)
    }

    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Encoding` if serialization fails.
    pub fn to_json(&self) -> GanttResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether the document predates initiatives.
    pub fn is_legacy(&self) -> bool {
        self.initiatives.is_empty()
    }

    /// Bring a legacy document up to the current layout.
    ///
    /// A default initiative is synthesized; top-level summary tasks become
    /// its projects. Current documents are left as they are.
    pub fn migrate(&mut self) {
        if !self.is_legacy() {
            return;
        }
        info!(
            "Migrating snapshot version '{}' with {} tasks",
            self.version,
            self.tasks.len()
        );

        self.initiatives
            .push(Initiative::new(DEFAULT_INITIATIVE_ID, DEFAULT_INITIATIVE_NAME));
        self.current_initiative_id = Some(DEFAULT_INITIATIVE_ID.to_string());
        for task in &mut self.tasks {
            if task.parent.is_none() && task.task_type == TaskType::Summary {
                task.is_project = true;
                task.initiative_id
                    .get_or_insert_with(|| DEFAULT_INITIATIVE_ID.to_string());
            }
        }
        self.version = SNAPSHOT_VERSION.to_string();
    }

    /// Rebuild an editor state from this document.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` for a looping parent graph and
    /// `GanttError::Validation` for duplicate task ids, blank names, or a
    /// start date after the end date. Unknown dependency ids are dropped.
    pub fn restore(mut self, today: NaiveDate) -> GanttResult<GanttState> {
        self.migrate();
        debug!("Restoring snapshot with {} tasks", self.tasks.len());
        let view = ViewState::from_parts(self.collapsed_tasks, self.current_zoom, self.selected_task);
        GanttState::from_parts(
            self.tasks,
            self.initiatives,
            self.current_initiative_id,
            view,
            today,
        )
    }
}

/// The bundled demo project: four phases with their tasks and milestones.
///
/// # Errors
///
/// Returns `GanttError::Encoding` if the bundled document is malformed.
pub fn sample_snapshot() -> GanttResult<Snapshot> {
    Snapshot::from_json(SAMPLE_PROJECT)
}

impl GanttState {
    /// A state holding the demo project.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document cannot be restored.
    pub fn sample(today: NaiveDate) -> GanttResult<Self> {
        sample_snapshot()?.restore(today)
    }

    /// Discard everything and start over with the demo project.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document cannot be restored; the
    /// state is left unchanged in that case.
    pub fn clear_all(&mut self) -> GanttResult<()> {
        let fresh = Self::sample(self.today())?;
        debug!("Clearing all data");
        *self = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GanttError;
    use crate::models::TaskDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sample_project_shape() {
        let snapshot = sample_snapshot().unwrap();
        assert_eq!(snapshot.tasks.len(), 18);
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);

        let projects: Vec<_> = snapshot
            .tasks
            .iter()
            .filter(|t| t.is_project)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(projects, vec!["1", "5", "10", "15"]);

        let milestones = snapshot.tasks.iter().filter(|t| t.is_milestone()).count();
        assert_eq!(milestones, 4);
    }

    #[test]
    fn test_sample_state_is_fully_visible() {
        let state = GanttState::sample(date(2024, 3, 1)).unwrap();
        assert_eq!(state.visible_tasks().unwrap().len(), 18);
        assert_eq!(state.task("10").unwrap().duration, 59);
        assert_eq!(state.task("3").unwrap().duration, 0);
    }

    #[test]
    fn test_legacy_document_migrates() {
        let raw = r#"{
            "version": "1.0",
            "lastSaved": "2024-02-01T10:00:00.000Z",
            "tasks": [
                {"id": "1", "name": "Phase", "startDate": "2024-01-01T00:00:00.000Z",
                 "endDate": "2024-01-15T00:00:00.000Z", "type": "summary", "parent": null},
                {"id": "2", "name": "Work", "startDate": "2024-01-02", "endDate": "2024-01-03",
                 "type": "task", "parent": "1"}
            ],
            "collapsedTasks": ["1"],
            "currentZoom": "fortnight",
            "selectedTask": "2"
        }"#;
        let snapshot = Snapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.initiatives.len(), 1);
        assert_eq!(snapshot.current_initiative_id.as_deref(), Some(DEFAULT_INITIATIVE_ID));
        assert!(snapshot.tasks[0].is_project);
        assert_eq!(snapshot.tasks[0].initiative_id.as_deref(), Some(DEFAULT_INITIATIVE_ID));
        assert_eq!(snapshot.tasks[1].initiative_id, None);
        assert_eq!(snapshot.current_zoom, ZoomLevel::Day);

        let state = snapshot.restore(date(2024, 2, 1)).unwrap();
        assert!(state.view().is_collapsed("1"));
        assert_eq!(state.selected().map(|t| t.id.as_str()), Some("2"));
    }

    #[test]
    fn test_capture_and_restore() {
        let mut state = GanttState::new(date(2025, 6, 15));
        let task = state
            .create(TaskDraft::new("Build", date(2025, 6, 1), date(2025, 6, 5)))
            .unwrap();
        state.toggle_collapse(&task.id).unwrap();
        state.set_zoom(ZoomLevel::Week);

        let json = Snapshot::capture(&state).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "2.0");
        assert_eq!(value["currentZoom"], "week");
        assert_eq!(value["tasks"][0]["startDate"], "2025-06-01");
        assert_eq!(value["collapsedTasks"][0], task.id.as_str());

        let restored = Snapshot::from_json(&json)
            .unwrap()
            .restore(date(2025, 6, 15))
            .unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_restore_rejects_cycles() {
        let raw = r#"{
            "version": "2.0",
            "initiatives": [{"id": "i1", "name": "One"}],
            "currentInitiativeId": "i1",
            "tasks": [
                {"id": "a", "name": "A", "startDate": "2024-01-01", "endDate": "2024-01-01", "parent": "b"},
                {"id": "b", "name": "B", "startDate": "2024-01-01", "endDate": "2024-01-01", "parent": "a"}
            ]
        }"#;
        let result = Snapshot::from_json(raw).unwrap().restore(date(2024, 1, 1));
        assert!(matches!(result, Err(GanttError::CycleDetected { .. })));
    }

    #[test]
    fn test_restore_rejects_broken_tasks() {
        let inverted = r#"{
            "version": "2.0",
            "tasks": [
                {"id": "a", "name": "A", "startDate": "2024-01-10", "endDate": "2024-01-01"}
            ]
        }"#;
        let result = Snapshot::from_json(inverted).unwrap().restore(date(2024, 1, 1));
        assert!(matches!(result, Err(GanttError::Validation { .. })));

        let unnamed = r#"{
            "version": "2.0",
            "tasks": [
                {"id": "a", "name": " ", "startDate": "2024-01-01", "endDate": "2024-01-02"}
            ]
        }"#;
        let result = Snapshot::from_json(unnamed).unwrap().restore(date(2024, 1, 1));
        assert!(matches!(result, Err(GanttError::Validation { .. })));
    }

    #[test]
    fn test_restore_drops_unknown_dependencies() {
        let raw = r#"{
            "version": "2.0",
            "initiatives": [{"id": "i1", "name": "One"}],
            "tasks": [
                {"id": "a", "name": "A", "startDate": "2024-01-01", "endDate": "2024-01-02"},
                {"id": "b", "name": "B", "startDate": "2024-01-03", "endDate": "2024-01-04",
                 "dependencies": ["ghost", "b", "a"]}
            ]
        }"#;
        let state = Snapshot::from_json(raw).unwrap().restore(date(2024, 1, 1)).unwrap();
        assert_eq!(state.task("b").unwrap().dependencies, vec!["a".to_string()]);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Snapshot::from_json("{ not json"),
            Err(GanttError::Encoding(_))
        ));
    }

    #[test]
    fn test_clear_all_restores_sample() {
        let mut state = GanttState::new(date(2025, 6, 15));
        state
            .create(TaskDraft::new("Scratch", date(2025, 6, 1), date(2025, 6, 5)))
            .unwrap();
        state.clear_all().unwrap();
        assert_eq!(state.tasks().len(), 18);
        assert_eq!(state.today(), date(2025, 6, 15));
    }
}
