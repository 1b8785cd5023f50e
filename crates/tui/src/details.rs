//! Details panel for the selected task.

use gantt_core::{GanttState, Task};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the details panel.
///
/// If `task` is `None`, displays "No task selected" message.
pub fn render_details_view(frame: &mut Frame, area: Rect, state: &GanttState, task: Option<&Task>) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    match task {
        Some(task) => {
            let paragraph = Paragraph::new(build_details_lines(state, task))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        None => {
            let paragraph = Paragraph::new("No task selected")
                .block(block)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, area);
        }
    }
}

fn label(text: &'static str) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::Cyan))
}

/// Name of a referenced task, or its id if it no longer exists.
fn task_name(state: &GanttState, id: &str) -> String {
    match state.task(id) {
        Some(task) => format!("{} ({})", task.name, id),
        None => id.to_string(),
    }
}

/// Build all the lines for the details panel.
pub fn build_details_lines(state: &GanttState, task: &Task) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            task.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{}] {}", task.id, task.task_type),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    let dates = if task.is_milestone() {
        format!("{}", task.start_date)
    } else {
        format!(
            "{} .. {} ({} days)",
            task.start_date, task.end_date, task.duration
        )
    };
    lines.push(Line::from(vec![label("Dates:    "), Span::raw(dates)]));
    lines.push(Line::from(vec![
        label("Progress: "),
        Span::raw(format!("{}%", task.progress)),
    ]));

    if let Some(parent) = &task.parent {
        lines.push(Line::from(vec![
            label("Parent:   "),
            Span::raw(task_name(state, parent)),
        ]));
    }

    if !task.dependencies.is_empty() {
        let names: Vec<String> = task
            .dependencies
            .iter()
            .map(|id| task_name(state, id))
            .collect();
        lines.push(Line::from(vec![
            label("Depends:  "),
            Span::raw(names.join(", ")),
        ]));
    }

    if !task.resources.is_empty() {
        lines.push(Line::from(vec![
            label("People:   "),
            Span::raw(task.resources.join(", ")),
        ]));
    }

    lines
}
