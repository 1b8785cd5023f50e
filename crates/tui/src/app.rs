//! Main application state and event loop.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as Days, Local};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gantt_core::{
    AutoSaver, GanttError, GanttResult, GanttState, SaveOutcome, Snapshot, SnapshotStore, Task,
    TimelineLayout,
};
use ratatui::Terminal;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::error::TuiResult;
use crate::event::{Action, action_for, poll_key};
use crate::timeline::{column_of, total_columns};
use crate::ui;

/// Columns moved per horizontal scroll step.
pub const SCROLL_STEP: i64 = 10;

/// Columns kept to the left of today when the editor opens.
const TODAY_MARGIN: i64 = 10;

/// What an action did to the state.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Nothing changed; no save.
    Unchanged,
    /// The state changed.
    Changed,
    /// The state changed and the status line says how.
    Reported(String),
}

/// Main application state.
pub struct App<S: SnapshotStore + 'static> {
    state: GanttState,
    /// Layout of the active initiative, rebuilt after every change.
    layout: TimelineLayout,
    saver: AutoSaver<S>,
    outcomes: UnboundedReceiver<SaveOutcome>,
    /// Message shown in the status line.
    status: String,
    running: bool,
    /// Horizontal scroll position in columns.
    scroll_col: i64,
}

impl<S: SnapshotStore + 'static> App<S> {
    /// Create the editor for `state`, saving to `store`.
    ///
    /// The timeline starts scrolled so today is in view.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Gantt` if the state cannot be laid out.
    pub fn new(state: GanttState, store: Arc<S>, status: impl Into<String>) -> TuiResult<Self> {
        let (saver, outcomes) = AutoSaver::new(store);
        Self::with_saver(state, saver, outcomes, status)
    }

    /// Create the editor with a preconfigured saver.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Gantt` if the state cannot be laid out.
    pub fn with_saver(
        state: GanttState,
        saver: AutoSaver<S>,
        outcomes: UnboundedReceiver<SaveOutcome>,
        status: impl Into<String>,
    ) -> TuiResult<Self> {
        let layout = state.layout()?;
        let scroll_col = (column_of(layout.today_offset) - TODAY_MARGIN).max(0);
        Ok(Self {
            state,
            layout,
            saver,
            outcomes,
            status: status.into(),
            running: true,
            scroll_col,
        })
    }

    pub fn state(&self) -> &GanttState {
        &self.state
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn scroll_col(&self) -> i64 {
        self.scroll_col
    }

    /// Check if the application is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a save is waiting for its timer.
    pub fn save_pending(&self) -> bool {
        self.saver.is_pending()
    }

    /// Row index of the selected task in the layout.
    pub fn selected_row(&self) -> Option<usize> {
        let id = self.state.view().selected()?;
        self.layout.row_of(id)
    }

    fn selected_task(&self) -> Option<Task> {
        self.state.selected().cloned()
    }

    fn refresh_layout(&mut self) -> GanttResult<()> {
        self.layout = self.state.layout()?;
        self.clamp_scroll();
        Ok(())
    }

    fn clamp_scroll(&mut self) {
        let max = (total_columns(&self.layout) - 1).max(0);
        self.scroll_col = self.scroll_col.clamp(0, max);
    }

    /// Move the viewport by `columns`.
    pub fn scroll_by(&mut self, columns: i64) {
        self.scroll_col = self.scroll_col.saturating_add(columns);
        self.clamp_scroll();
    }

    /// Apply one user action.
    ///
    /// Rejected edits are reported in the status line and leave the state
    /// untouched. Every change schedules a save.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Gantt` only if the changed state cannot be laid
    /// out again.
    pub async fn handle_action(&mut self, action: Action) -> TuiResult<()> {
        let result = match action {
            Action::Quit => {
                self.running = false;
                return Ok(());
            }
            Action::ScrollLeft => {
                self.scroll_by(-SCROLL_STEP);
                return Ok(());
            }
            Action::ScrollRight => {
                self.scroll_by(SCROLL_STEP);
                return Ok(());
            }
            Action::SelectNext => self.select_offset(1),
            Action::SelectPrevious => self.select_offset(-1),
            Action::ToggleCollapse => self.toggle_selected(),
            Action::CycleZoom => Ok(self.cycle_zoom()),
            Action::MoveEarlier => self.shift_selected(-1),
            Action::MoveLater => self.shift_selected(1),
            Action::Lengthen => self.resize_selected(1),
            Action::Shorten => self.resize_selected(-1),
            Action::Complete => self.complete_selected(),
            Action::Delete => self.delete_selected(),
            Action::ExpandAll => {
                self.state.expand_all();
                Ok(Outcome::Reported("Expanded all tasks".to_string()))
            }
            Action::CollapseAll => {
                self.state.collapse_all();
                Ok(Outcome::Reported("Collapsed all summaries".to_string()))
            }
            Action::NextInitiative => self.next_initiative(),
        };

        match result {
            Ok(Outcome::Unchanged) => {}
            Ok(outcome) => {
                if let Outcome::Reported(message) = outcome {
                    self.status = message;
                }
                self.refresh_layout()?;
                self.saver.schedule(Snapshot::capture(&self.state)).await;
            }
            Err(e) => {
                warn!("{:?} rejected: {}", action, e.full_message());
                self.status = format!("Error: {}", e.full_message());
            }
        }
        Ok(())
    }

    fn select_offset(&mut self, delta: isize) -> GanttResult<Outcome> {
        let rows = &self.layout.rows;
        let Some(last) = rows.len().checked_sub(1) else {
            return Ok(Outcome::Unchanged);
        };
        let target = match self.selected_row() {
            Some(index) => index.saturating_add_signed(delta).min(last),
            None if delta < 0 => last,
            None => 0,
        };
        if Some(target) == self.selected_row() {
            return Ok(Outcome::Unchanged);
        }
        let id = rows[target].task.id.clone();
        self.state.select(Some(id.as_str()))?;
        Ok(Outcome::Changed)
    }

    fn toggle_selected(&mut self) -> GanttResult<Outcome> {
        let Some(row) = self.selected_row().map(|i| &self.layout.rows[i]) else {
            return Ok(Outcome::Unchanged);
        };
        if !row.has_children {
            return Ok(Outcome::Unchanged);
        }
        let id = row.task.id.clone();
        let name = row.task.name.clone();
        let collapsed = self.state.toggle_collapse(&id)?;
        let verb = if collapsed { "Collapsed" } else { "Expanded" };
        Ok(Outcome::Reported(format!("{}: {}", verb, name)))
    }

    /// Switch to the next zoom level and keep the left edge on the same
    /// date.
    fn cycle_zoom(&mut self) -> Outcome {
        let current = self.state.zoom();
        let next = current.cycle();
        self.scroll_col = self.scroll_col * next.day_width() / current.day_width();
        self.state.set_zoom(next);
        Outcome::Reported(format!("Zoom: {} ({} px per day)", next, next.day_width()))
    }

    fn require_selection(&mut self) -> Option<Task> {
        let task = self.selected_task();
        if task.is_none() {
            self.status = "No task selected".to_string();
        }
        task
    }

    fn shift_selected(&mut self, days: i64) -> GanttResult<Outcome> {
        let Some(task) = self.require_selection() else {
            return Ok(Outcome::Unchanged);
        };
        let new_start = task
            .start_date
            .checked_add_signed(Days::days(days))
            .ok_or_else(|| GanttError::geometry("Start date leaves the calendar"))?;
        let moved = self
            .state
            .reposition_by_drag(&task.id, new_start, task.duration)?;
        Ok(Outcome::Reported(format!(
            "Moved {}: {} .. {}",
            moved.name, moved.start_date, moved.end_date
        )))
    }

    fn resize_selected(&mut self, days: i64) -> GanttResult<Outcome> {
        let Some(task) = self.require_selection() else {
            return Ok(Outcome::Unchanged);
        };
        let resized =
            self.state
                .reposition_by_drag(&task.id, task.start_date, task.duration + days)?;
        Ok(Outcome::Reported(format!(
            "{}: {} days",
            resized.name, resized.duration
        )))
    }

    fn complete_selected(&mut self) -> GanttResult<Outcome> {
        let Some(task) = self.require_selection() else {
            return Ok(Outcome::Unchanged);
        };
        if task.is_complete() {
            self.status = format!("{} is already complete", task.name);
            return Ok(Outcome::Unchanged);
        }
        self.state.mark_complete(&task.id)?;
        Ok(Outcome::Reported(format!("Completed: {}", task.name)))
    }

    /// Delete the selected task and select the row that takes its place.
    fn delete_selected(&mut self) -> GanttResult<Outcome> {
        let Some(task) = self.require_selection() else {
            return Ok(Outcome::Unchanged);
        };
        let index = self.selected_row().unwrap_or(0);
        self.state.delete(&task.id)?;

        let rows = self.state.layout()?.rows;
        if let Some(next) = rows.get(index).or_else(|| rows.last()) {
            self.state.select(Some(next.task.id.as_str()))?;
        }
        Ok(Outcome::Reported(format!("Deleted: {}", task.name)))
    }

    fn next_initiative(&mut self) -> GanttResult<Outcome> {
        let initiatives = self.state.initiatives();
        if initiatives.len() < 2 {
            self.status = "No other initiative".to_string();
            return Ok(Outcome::Unchanged);
        }
        let current = initiatives
            .iter()
            .position(|i| i.id == self.state.current_initiative_id())
            .unwrap_or(0);
        let next = initiatives[(current + 1) % initiatives.len()].clone();
        self.state.switch_initiative(&next.id)?;
        self.scroll_col = 0;
        Ok(Outcome::Reported(format!("Initiative: {}", next.name)))
    }

    /// Show finished saves in the status line.
    pub fn drain_save_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.status = match outcome {
                SaveOutcome::Saved { at, tasks } => format!(
                    "Saved {} tasks at {}",
                    tasks,
                    at.with_timezone(&Local).format("%H:%M:%S")
                ),
                SaveOutcome::Failed { message } => format!("Save failed: {}", message),
            };
        }
    }

    /// Write any pending save now.
    ///
    /// # Errors
    ///
    /// Returns `TuiError::Gantt` if the store rejects the write.
    pub async fn flush(&mut self) -> TuiResult<()> {
        self.saver.flush().await?;
        self.drain_save_outcomes();
        Ok(())
    }

    /// Run the main application loop.
    ///
    /// This initializes the terminal, runs the event loop, and ensures
    /// the terminal is restored on exit (even on panic). A pending save
    /// is written before returning.
    pub async fn run(&mut self) -> TuiResult<()> {
        let mut terminal = init_terminal()?;

        // Use scopeguard to ensure terminal cleanup on panic
        let guard = scopeguard::guard((), |()| {
            let _ = restore_terminal();
        });

        let result = self.event_loop(&mut terminal).await;
        drop(guard);

        info!("Editor closed, flushing pending save");
        let flushed = self.flush().await;
        result.and(flushed)
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> TuiResult<()> {
        while self.running {
            self.drain_save_outcomes();
            terminal.draw(|frame| ui::draw(frame, self))?;

            if let Some(key) = poll_key(Duration::from_millis(100))?
                && let Some(action) = action_for(&key)
            {
                debug!("Key {:?} -> {:?}", key.code, action);
                self.handle_action(action).await?;
            }
        }
        Ok(())
    }
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> TuiResult<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gantt_core::{MemoryStore, TaskDraft, ZoomLevel};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_with(state: GanttState) -> (App<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let app = App::new(state, Arc::clone(&store), "ready").unwrap();
        (app, store)
    }

    fn sample_app() -> (App<MemoryStore>, Arc<MemoryStore>) {
        app_with(GanttState::sample(today()).unwrap())
    }

    async fn select(app: &mut App<MemoryStore>, id: &str) {
        while app.state().view().selected() != Some(id) {
            app.handle_action(Action::SelectNext).await.unwrap();
        }
    }

    fn selected_id(app: &App<MemoryStore>) -> Option<&str> {
        app.state().view().selected()
    }

    // ========================================
    // Startup tests
    // ========================================

    #[tokio::test]
    async fn test_new_shows_today() {
        let (app, _) = sample_app();
        let today_col = column_of(app.layout().today_offset);
        assert_eq!(app.scroll_col(), today_col - TODAY_MARGIN);
        assert_eq!(app.status(), "ready");
        assert!(app.is_running());
        assert_eq!(app.layout().rows.len(), 18);
    }

    // ========================================
    // Selection tests
    // ========================================

    #[tokio::test]
    async fn test_select_next_from_nothing_picks_first_row() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::SelectNext).await.unwrap();
        assert_eq!(selected_id(&app), Some("1"));
        assert_eq!(app.selected_row(), Some(0));
        assert!(app.save_pending());
    }

    #[tokio::test]
    async fn test_select_previous_from_nothing_picks_last_row() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::SelectPrevious).await.unwrap();
        assert_eq!(selected_id(&app), Some("18"));
    }

    #[tokio::test]
    async fn test_select_previous_clamps_at_first_row() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::SelectNext).await.unwrap();
        app.flush().await.unwrap();

        app.handle_action(Action::SelectPrevious).await.unwrap();
        assert_eq!(selected_id(&app), Some("1"));
        assert!(!app.save_pending());
    }

    #[tokio::test]
    async fn test_select_next_clamps_at_last_row() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::SelectPrevious).await.unwrap();
        app.handle_action(Action::SelectNext).await.unwrap();
        assert_eq!(selected_id(&app), Some("18"));
    }

    #[tokio::test]
    async fn test_selection_on_empty_project_is_noop() {
        let (mut app, _) = app_with(GanttState::new(today()));
        app.handle_action(Action::SelectNext).await.unwrap();
        assert_eq!(selected_id(&app), None);
        assert!(!app.save_pending());
    }

    // ========================================
    // Collapse tests
    // ========================================

    #[tokio::test]
    async fn test_toggle_collapse_hides_children() {
        let (mut app, _) = sample_app();
        select(&mut app, "1").await;

        app.handle_action(Action::ToggleCollapse).await.unwrap();
        assert_eq!(app.layout().rows.len(), 15);
        assert_eq!(app.status(), "Collapsed: Project Planning Phase");

        app.handle_action(Action::ToggleCollapse).await.unwrap();
        assert_eq!(app.layout().rows.len(), 18);
    }

    #[tokio::test]
    async fn test_toggle_on_leaf_is_noop() {
        let (mut app, _) = sample_app();
        select(&mut app, "2").await;
        app.handle_action(Action::ToggleCollapse).await.unwrap();
        assert_eq!(app.layout().rows.len(), 18);
    }

    #[tokio::test]
    async fn test_collapse_all_and_expand_all() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::CollapseAll).await.unwrap();
        assert_eq!(app.layout().rows.len(), 4);
        app.handle_action(Action::ExpandAll).await.unwrap();
        assert_eq!(app.layout().rows.len(), 18);
    }

    // ========================================
    // Editing tests
    // ========================================

    #[tokio::test]
    async fn test_move_later_keeps_duration() {
        let (mut app, _) = sample_app();
        select(&mut app, "2").await;

        app.handle_action(Action::MoveLater).await.unwrap();
        let task = app.state().task("2").unwrap();
        assert_eq!(task.start_date, date(2024, 1, 2));
        assert_eq!(task.end_date, date(2024, 1, 9));
        assert_eq!(task.duration, 8);
    }

    #[tokio::test]
    async fn test_move_earlier() {
        let (mut app, _) = sample_app();
        select(&mut app, "2").await;
        app.handle_action(Action::MoveEarlier).await.unwrap();
        assert_eq!(app.state().task("2").unwrap().start_date, date(2023, 12, 31));
    }

    #[tokio::test]
    async fn test_lengthen_and_shorten() {
        let (mut app, _) = sample_app();
        select(&mut app, "2").await;

        app.handle_action(Action::Lengthen).await.unwrap();
        assert_eq!(app.state().task("2").unwrap().end_date, date(2024, 1, 9));
        app.handle_action(Action::Shorten).await.unwrap();
        app.handle_action(Action::Shorten).await.unwrap();
        assert_eq!(app.state().task("2").unwrap().end_date, date(2024, 1, 7));
        assert_eq!(app.state().task("2").unwrap().start_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn test_shorten_below_one_day_is_rejected() {
        let mut state = GanttState::new(today());
        state
            .create(TaskDraft::new("Short", today(), today()))
            .unwrap();
        let (mut app, _) = app_with(state);
        app.handle_action(Action::SelectNext).await.unwrap();

        app.handle_action(Action::Shorten).await.unwrap();
        assert!(app.status().starts_with("Error:"));
        assert_eq!(app.state().selected().unwrap().duration, 1);
    }

    #[tokio::test]
    async fn test_moving_milestone_is_rejected() {
        let (mut app, _) = sample_app();
        select(&mut app, "3").await;
        let before = app.state().task("3").unwrap().clone();

        app.handle_action(Action::MoveLater).await.unwrap();
        assert!(app.status().starts_with("Error:"));
        assert_eq!(app.state().task("3").unwrap(), &before);
    }

    #[tokio::test]
    async fn test_edit_without_selection_reports() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::MoveLater).await.unwrap();
        assert_eq!(app.status(), "No task selected");
        assert!(!app.save_pending());
    }

    #[tokio::test]
    async fn test_complete_selected() {
        let (mut app, _) = sample_app();
        select(&mut app, "13").await;

        app.handle_action(Action::Complete).await.unwrap();
        assert_eq!(app.state().task("13").unwrap().progress, 100);
        assert_eq!(app.status(), "Completed: Integration Testing");

        app.handle_action(Action::Complete).await.unwrap();
        assert_eq!(app.status(), "Integration Testing is already complete");
    }

    #[tokio::test]
    async fn test_delete_selects_next_row() {
        let (mut app, _) = sample_app();
        select(&mut app, "6").await;

        app.handle_action(Action::Delete).await.unwrap();
        assert!(app.state().task("6").is_none());
        assert_eq!(selected_id(&app), Some("7"));
        assert_eq!(app.layout().rows.len(), 17);
    }

    #[tokio::test]
    async fn test_delete_last_row_selects_new_last() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::SelectPrevious).await.unwrap();
        app.handle_action(Action::Delete).await.unwrap();
        assert_eq!(selected_id(&app), Some("17"));
    }

    // ========================================
    // Zoom and scroll tests
    // ========================================

    #[tokio::test]
    async fn test_cycle_zoom_keeps_left_date() {
        let (mut app, _) = sample_app();
        let before = app.scroll_col();

        app.handle_action(Action::CycleZoom).await.unwrap();
        assert_eq!(app.state().zoom(), ZoomLevel::Week);
        assert_eq!(app.scroll_col(), before / 2);
    }

    #[tokio::test]
    async fn test_scroll_is_clamped() {
        let (mut app, _) = sample_app();
        for _ in 0..1000 {
            app.handle_action(Action::ScrollLeft).await.unwrap();
        }
        assert_eq!(app.scroll_col(), 0);

        for _ in 0..1000 {
            app.handle_action(Action::ScrollRight).await.unwrap();
        }
        assert_eq!(app.scroll_col(), total_columns(app.layout()) - 1);
        assert!(!app.save_pending());
    }

    // ========================================
    // Initiative tests
    // ========================================

    #[tokio::test]
    async fn test_next_initiative_with_one_initiative() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::NextInitiative).await.unwrap();
        assert_eq!(app.status(), "No other initiative");
    }

    #[tokio::test]
    async fn test_next_initiative_cycles() {
        let mut state = GanttState::sample(today()).unwrap();
        let first = state.current_initiative_id().to_string();
        let second = state.create_initiative("Side project", "").unwrap();
        let (mut app, _) = app_with(state);

        app.handle_action(Action::NextInitiative).await.unwrap();
        assert_eq!(app.state().current_initiative_id(), second.id);
        assert!(app.layout().rows.is_empty());
        assert_eq!(app.status(), "Initiative: Side project");

        app.handle_action(Action::NextInitiative).await.unwrap();
        assert_eq!(app.state().current_initiative_id(), first);
        assert_eq!(app.layout().rows.len(), 18);
    }

    // ========================================
    // Saving tests
    // ========================================

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_latest_state() {
        let (mut app, store) = sample_app();
        select(&mut app, "13").await;
        app.handle_action(Action::Complete).await.unwrap();

        app.flush().await.unwrap();
        assert_eq!(store.save_count(), 1);
        let saved = store.load().await.unwrap().unwrap();
        let task = saved.tasks.iter().find(|t| t.id == "13").unwrap();
        assert_eq!(task.progress, 100);
        assert_eq!(saved.selected_task.as_deref(), Some("13"));
        assert!(app.status().starts_with("Saved 18 tasks at "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported() {
        let (mut app, store) = sample_app();
        store.set_failing(true);
        app.handle_action(Action::SelectNext).await.unwrap();

        assert!(app.flush().await.is_err());
        app.drain_save_outcomes();
        assert!(app.status().starts_with("Save failed:"));
        assert_eq!(app.state().tasks().len(), 18);
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let (mut app, _) = sample_app();
        app.handle_action(Action::Quit).await.unwrap();
        assert!(!app.is_running());
    }
}
