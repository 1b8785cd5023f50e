//! Store behaviour against real files and the embedded document store.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::TestDir;
use gantt_core::persistence::SNAPSHOT_FILE_NAME;
use gantt_core::{
    AutoSaver, GanttState, LoadSource, LocalFileStore, Snapshot, SnapshotStore, TaskDraft,
    load_or_sample, open_project_store,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

#[tokio::test]
async fn local_only_store_round_trips_through_file() {
    let dir = TestDir::new("local-only");
    let config = dir.config(true);

    let store = open_project_store(&config).await;
    assert!(!store.primary_available());
    assert!(store.primary().is_none());

    let (mut state, source) = load_or_sample(&store, today()).await.unwrap();
    assert_eq!(source, LoadSource::Sample);
    state.mark_complete("13").unwrap();
    store.save(&Snapshot::capture(&state)).await.unwrap();

    assert!(config.project_dir().join(SNAPSHOT_FILE_NAME).exists());
    let (reloaded, source) = load_or_sample(&store, today()).await.unwrap();
    assert!(matches!(source, LoadSource::Stored { .. }));
    assert_eq!(reloaded, state);
}

#[tokio::test]
async fn project_store_writes_document_and_file() {
    let dir = TestDir::new("both");
    let config = dir.config(false);

    let store = open_project_store(&config).await;
    assert!(store.primary_available());

    let mut state = GanttState::new(today());
    state
        .create(TaskDraft::new("Persisted", today(), today()))
        .unwrap();
    let snapshot = Snapshot::capture(&state);
    store.save(&snapshot).await.unwrap();

    let from_document = store.primary().unwrap().load().await.unwrap();
    let from_file = store.fallback().load().await.unwrap();
    assert_eq!(from_document, Some(snapshot.clone()));
    assert_eq!(from_file, Some(snapshot));
}

#[tokio::test]
async fn legacy_file_is_migrated_on_load() {
    let dir = TestDir::new("legacy");
    let config = dir.config(true);
    std::fs::create_dir_all(config.project_dir()).unwrap();
    std::fs::write(
        config.project_dir().join(SNAPSHOT_FILE_NAME),
        r##"{
            "version": "1.0",
            "lastSaved": "2024-02-01T10:00:00.000Z",
            "tasks": [
                {"id": "1", "name": "Phase", "startDate": "2024-01-01T00:00:00.000Z",
                 "endDate": "2024-01-31T00:00:00.000Z", "duration": 31, "progress": 50,
                 "type": "summary", "parent": null, "dependencies": [], "resources": [],
                 "color": "#4CAF50"}
            ],
            "collapsedTasks": [],
            "currentZoom": "month",
            "selectedTask": null
        }"##,
    )
    .unwrap();

    let store = LocalFileStore::new(&config.project_dir());
    let (state, source) = load_or_sample(&store, today()).await.unwrap();
    assert!(matches!(source, LoadSource::Stored { .. }));
    assert_eq!(state.initiatives().len(), 1);
    assert!(state.task("1").unwrap().is_project);
    assert_eq!(state.visible_tasks().unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_file_falls_back_to_sample() {
    let dir = TestDir::new("corrupt");
    let config = dir.config(true);
    std::fs::create_dir_all(config.project_dir()).unwrap();
    std::fs::write(config.project_dir().join(SNAPSHOT_FILE_NAME), "not json").unwrap();

    let store = open_project_store(&config).await;
    let (state, source) = load_or_sample(&store, today()).await.unwrap();
    assert!(matches!(source, LoadSource::SampleAfterError { .. }));
    assert_eq!(state.tasks().len(), 18);
}

#[tokio::test]
async fn autosave_flush_reaches_disk() {
    let dir = TestDir::new("autosave");
    let config = dir.config(true);
    let store = Arc::new(open_project_store(&config).await);
    let (mut saver, mut outcomes) = AutoSaver::new(Arc::clone(&store));

    let mut state = GanttState::new(today());
    for name in ["One", "Two", "Three"] {
        state.create(TaskDraft::new(name, today(), today())).unwrap();
        saver.schedule(Snapshot::capture(&state)).await;
    }
    saver.flush().await.unwrap();
    assert!(outcomes.recv().await.unwrap().is_saved());

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.tasks.len(), 3);
}
