//! Task list panel.
//!
//! Shows the visible rows of the active initiative, indented by depth with
//! collapse markers. Rows line up with the bars in the timeline panel.

use gantt_core::{RowLayout, TaskType};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::timeline::HEADER_ROWS;

/// Index of the first row to draw so `selected` stays inside a body of
/// `height` rows.
pub fn first_visible_row(selected: Option<usize>, height: usize) -> usize {
    match selected {
        Some(index) if height > 0 && index >= height => index + 1 - height,
        _ => 0,
    }
}

fn collapse_marker(row: &RowLayout) -> &'static str {
    match (row.has_children, row.is_collapsed) {
        (true, true) => "▸ ",
        (true, false) => "▾ ",
        (false, _) => "  ",
    }
}

fn type_style(task_type: TaskType) -> Style {
    match task_type {
        TaskType::Summary => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        TaskType::Milestone => Style::default().fg(Color::Magenta),
        TaskType::Task => Style::default().fg(Color::Gray),
    }
}

/// Build the display line for a single row.
pub fn build_row_line(row: &RowLayout) -> Line<'static> {
    let indent = "  ".repeat(row.depth);
    let marker = collapse_marker(row);
    let mut name_style = type_style(row.task.task_type);
    if row.is_selected {
        name_style = name_style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::raw(indent),
        Span::styled(marker, Style::default().fg(Color::Yellow)),
    ];
    if row.task.is_milestone() {
        spans.push(Span::styled("◆ ", Style::default().fg(Color::Magenta)));
    }
    spans.push(Span::styled(row.task.name.clone(), name_style));
    if row.task.is_complete() && !row.task.is_milestone() {
        spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

/// Render the task list panel.
///
/// # Arguments
///
/// * `title` - Panel title, usually the initiative name
/// * `rows` - Visible rows in display order
/// * `first_row` - Index of the first row shown
/// * `empty_message` - Shown when there are no rows
pub fn render_task_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[RowLayout],
    first_row: usize,
    empty_message: &str,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if rows.is_empty() {
        let paragraph = Paragraph::new(empty_message)
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let body_height = usize::from(block.inner(area).height).saturating_sub(HEADER_ROWS);

    // Blank lines matching the timeline header keep rows aligned with bars
    let mut lines = vec![
        Line::styled("Task", Style::default().fg(Color::Cyan)),
        Line::from(""),
    ];
    lines.extend(
        rows.iter()
            .skip(first_row)
            .take(body_height)
            .map(build_row_line),
    );

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
