//! UI rendering for the TUI.
//!
//! Provides layout and widget rendering using ratatui.

use gantt_core::SnapshotStore;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::app::App;
use crate::details::render_details_view;
use crate::navigation::{first_visible_row, render_task_list};
use crate::timeline::{HEADER_ROWS, render_timeline_view};

/// Height of the details panel including borders.
const DETAILS_HEIGHT: u16 = 8;

/// Legend text for keyboard shortcuts.
const LEGEND: &str = " [j/k] Select  [Enter] Fold  [h/l] Scroll  [z] Zoom  [</>] Move  [+/-] Length  [c] Done  [d] Delete  [E/C] Unfold/Fold all  [i] Initiative  [q] Quit ";

/// Screen regions of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub task_list: Rect,
    pub timeline: Rect,
    pub details: Rect,
    pub status: Rect,
    pub legend: Rect,
}

/// Split the screen: task list and timeline side by side, details below,
/// then the status line and the legend.
pub fn create_main_layout(area: Rect) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                 // Task list + timeline
            Constraint::Length(DETAILS_HEIGHT), // Details panel
            Constraint::Length(1),              // Status line
            Constraint::Length(1),              // Legend bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    Regions {
        task_list: columns[0],
        timeline: columns[1],
        details: rows[1],
        status: rows[2],
        legend: rows[3],
    }
}

/// Rows available for tasks inside a bordered chart panel.
fn body_height(panel: Rect) -> usize {
    usize::from(panel.height.saturating_sub(2)).saturating_sub(HEADER_ROWS)
}

/// Draw the entire UI.
pub fn draw<S: SnapshotStore + 'static>(frame: &mut Frame, app: &App<S>) {
    let regions = create_main_layout(frame.area());
    let state = app.state();
    let layout = app.layout();
    let first_row = first_visible_row(app.selected_row(), body_height(regions.timeline));

    let title = state
        .current_initiative()
        .map_or("Tasks", |initiative| initiative.name.as_str());
    render_task_list(
        frame,
        regions.task_list,
        title,
        &layout.rows,
        first_row,
        "No tasks found",
    );
    render_timeline_view(frame, regions.timeline, layout, app.scroll_col(), first_row);
    render_details_view(frame, regions.details, state, state.selected());

    let status = Paragraph::new(format!(" {}", app.status())).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, regions.status);

    let legend = Paragraph::new(LEGEND).style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(legend, regions.legend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use gantt_core::{GanttState, MemoryStore};
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_legend_not_empty() {
        assert!(!LEGEND.is_empty());
    }

    #[test]
    fn test_layout_regions_stack() {
        let regions = create_main_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(regions.legend.y, 39);
        assert_eq!(regions.status.y, 38);
        assert_eq!(regions.details.height, DETAILS_HEIGHT);
        assert_eq!(regions.task_list.y, regions.timeline.y);
        assert_eq!(regions.task_list.width + regions.timeline.width, 100);
    }

    #[test]
    fn test_layout_small_terminal() {
        let regions = create_main_layout(Rect::new(0, 0, 40, 10));
        assert_eq!(regions.legend.height, 1);
    }

    #[test]
    fn test_body_height_excludes_borders_and_header() {
        assert_eq!(body_height(Rect::new(0, 0, 10, 20)), 16);
        assert_eq!(body_height(Rect::new(0, 0, 10, 3)), 0);
    }

    #[tokio::test]
    async fn test_draw_sample_project() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let state = GanttState::sample(today).unwrap();
        let app = App::new(state, Arc::new(MemoryStore::new()), "Loaded sample data").unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Project Planning Phase"));
        assert!(screen.contains("Timeline (day)"));
        assert!(screen.contains("No task selected"));
        assert!(screen.contains("Loaded sample data"));
    }
}
