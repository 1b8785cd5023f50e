//! End-to-end scenarios against the public engine API.

use chrono::{Duration, NaiveDate};
use gantt_core::{
    GanttError, GanttState, Snapshot, TaskDraft, TaskPatch, TaskType, ZoomLevel, date_at_offset,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========================================
// Scenarios
// ========================================

#[test]
fn scenario_a_month_task_in_week_zoom() {
    let mut state = GanttState::new(date(2025, 6, 15));
    let task = state
        .create(TaskDraft::new("June", date(2025, 6, 1), date(2025, 6, 30)))
        .unwrap();
    assert_eq!(task.duration, 30);

    state.set_zoom(ZoomLevel::Week);
    let layout = state.layout().unwrap();
    assert_eq!(layout.day_width, 20);
    assert!(!layout.header.is_empty());
    for cell in &layout.header {
        assert_eq!(cell.date.format("%a").to_string(), "Mon");
        assert!(cell.label.starts_with("Week "));
    }

    let row = &layout.rows[layout.row_of(&task.id).unwrap()];
    assert_eq!(row.bar.width, 30 * 20);
}

#[test]
fn scenario_b_empty_project_bounds() {
    let state = GanttState::new(date(2025, 6, 15));
    let bounds = state.bounds();
    assert!(bounds.contains(date(2025, 6, 15)));
    assert!(bounds.total_days() >= 270);
}

#[test]
fn scenario_c_child_inherits_initiative() {
    let mut state = GanttState::new(date(2025, 6, 15));
    let other = state.create_initiative("Other", "").unwrap();
    state.switch_initiative(&other.id).unwrap();

    let project = state
        .create(
            TaskDraft::new("Project", date(2025, 6, 1), date(2025, 7, 1))
                .with_type(TaskType::Summary),
        )
        .unwrap();
    let child = state
        .create(TaskDraft::new("Child", date(2025, 6, 2), date(2025, 6, 4)).with_parent(&project.id))
        .unwrap();

    // Drop the child's own initiative; it must resolve through the parent
    let snapshot = Snapshot::capture(&state);
    let mut raw: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
    for task in raw["tasks"].as_array_mut().unwrap() {
        if task["id"] == child.id.as_str() {
            task["initiativeId"] = serde_json::Value::Null;
        }
    }
    let restored = Snapshot::from_json(&raw.to_string())
        .unwrap()
        .restore(date(2025, 6, 15))
        .unwrap();

    let resolved = restored
        .tree()
        .resolve_initiative(restored.task(&child.id).unwrap())
        .unwrap();
    assert_eq!(resolved, Some(other.id.as_str()));

    let visible: Vec<_> = restored
        .visible_tasks()
        .unwrap()
        .iter()
        .map(|v| (v.task.id.clone(), v.depth))
        .collect();
    assert_eq!(visible, vec![(project.id, 0), (child.id, 1)]);
}

#[test]
fn scenario_d_drop_snaps_to_day() {
    let start = date(2025, 1, 1);
    assert_eq!(date_at_offset(80, start, 40).unwrap(), start + Duration::days(2));

    let mut state = GanttState::new(date(2025, 6, 15));
    let task = state
        .create(TaskDraft::new("Build", date(2025, 6, 1), date(2025, 6, 3)))
        .unwrap();
    let origin = state.bounds().start;
    let moved = state.apply_drag(&task.id, 80, 120).unwrap();
    assert_eq!(moved.start_date, origin + Duration::days(2));
    assert_eq!(moved.end_date, origin + Duration::days(4));
}

// ========================================
// Error paths leave the state untouched
// ========================================

#[test]
fn failed_mutations_do_not_change_state() {
    let mut state = GanttState::sample(date(2024, 3, 1)).unwrap();
    let before = state.clone();

    assert!(matches!(
        state.update("1", TaskPatch::new().with_parent("2")),
        Err(GanttError::CycleDetected { .. })
    ));
    assert!(matches!(
        state.reposition_by_drag("14", date(2024, 4, 20), 1),
        Err(GanttError::NotDraggable { .. })
    ));
    assert!(matches!(
        state.update("2", TaskPatch::new().with_dates(date(2024, 2, 1), date(2024, 1, 1))),
        Err(GanttError::Validation { .. })
    ));
    assert!(matches!(
        state.delete("999"),
        Err(GanttError::NotFound { .. })
    ));
    assert_eq!(state, before);
}

#[test]
fn sample_project_collapse_and_expand() {
    let mut state = GanttState::sample(date(2024, 3, 1)).unwrap();
    state.collapse_all();
    let rows: Vec<_> = state
        .visible_tasks()
        .unwrap()
        .iter()
        .map(|v| v.task.id.clone())
        .collect();
    assert_eq!(rows, vec!["1", "5", "10", "15"]);

    state.toggle_collapse("10").unwrap();
    assert_eq!(state.visible_tasks().unwrap().len(), 8);

    state.expand_all();
    assert_eq!(state.visible_tasks().unwrap().len(), 18);
}

#[test]
fn deleting_phase_promotes_its_tasks() {
    let mut state = GanttState::sample(date(2024, 3, 1)).unwrap();
    state.delete("5").unwrap();

    for id in ["6", "7", "8", "9"] {
        let task = state.task(id).unwrap();
        assert_eq!(task.parent, None);
    }
    // Dependencies on the phase are gone
    assert!(state.task("6").unwrap().dependencies.iter().all(|d| d != "5"));
    assert!(state.task("10").unwrap().dependencies.iter().all(|d| d != "5"));
    assert_eq!(state.visible_tasks().unwrap().len(), 17);
}

#[test]
fn cascade_delete_of_phase() {
    let mut state = GanttState::sample(date(2024, 3, 1)).unwrap();
    let removed = state.delete_cascade("15").unwrap();
    assert_eq!(removed, vec!["15", "16", "17", "18"]);
    assert_eq!(state.tasks().len(), 14);
}

#[test]
fn layout_marks_today_and_selection() {
    let mut state = GanttState::sample(date(2024, 3, 1)).unwrap();
    state.select(Some("12")).unwrap();
    let layout = state.layout().unwrap();

    let expected = (date(2024, 3, 1) - layout.bounds.start).num_days() * 40;
    assert_eq!(layout.today_offset, expected);
    let selected: Vec<_> = layout.rows.iter().filter(|r| r.is_selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].task.id, "12");
    assert_eq!(layout.rows.iter().filter(|r| r.task.is_milestone()).count(), 4);
}
