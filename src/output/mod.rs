//! Output formatting module for the Gantt CLI
//!
//! Provides table formatting and the text rendering of the timeline.

use gantt_core::{Initiative, TimelineLayout};

use crate::commands::list::TaskSummary;

/// Maximum width for the name column before truncation
const MAX_NAME_WIDTH: usize = 40;

/// Width of the task name column in the timeline chart
pub const CHART_NAME_WIDTH: usize = 28;

/// Engine pixels drawn by one character column of the chart
pub const PIXELS_PER_COLUMN: i64 = 10;

const BAR_DONE: char = '█';
const BAR_TODO: char = '░';
const MILESTONE: char = '◆';
const TODAY: char = '|';

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    let count = s.chars().count();
    if count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

fn pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - count))
    }
}

/// Tree marker shown before a task name.
fn tree_marker(has_children: bool, collapsed: bool) -> &'static str {
    match (has_children, collapsed) {
        (true, true) => "▸ ",
        (true, false) => "▾ ",
        (false, _) => "  ",
    }
}

/// Indented, marked, and truncated name cell.
fn name_cell(name: &str, depth: usize, has_children: bool, collapsed: bool, width: usize) -> String {
    let label = format!(
        "{}{}{}",
        "  ".repeat(depth),
        tree_marker(has_children, collapsed),
        name
    );
    truncate(&label, width)
}

/// Format tasks into an aligned table string.
///
/// Produces output in the format:
/// ```text
///   ID  Type     Start       End         Days  Done  Name
///   --  -------  ----------  ----------  ----  ----  ------------------------
/// * 1   summary  2024-01-01  2024-01-15    15  100%  ▾ Project Planning Phase
/// ```
///
/// The leading `*` marks the selected task.
///
/// # Arguments
///
/// * `tasks` - Slice of task summaries to format
///
/// # Returns
///
/// A formatted string containing the table, or an empty result message if no tasks.
pub fn format_task_table(tasks: &[TaskSummary]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let headers = ["ID", "Type", "Start", "End", "Days", "Done", "Name"];
    let names: Vec<String> = tasks
        .iter()
        .map(|t| name_cell(&t.name, t.depth, t.has_children, t.collapsed, MAX_NAME_WIDTH))
        .collect();

    let id_width = tasks
        .iter()
        .map(|t| t.id.len())
        .max()
        .unwrap_or(0)
        .max(headers[0].len());
    let type_width = tasks
        .iter()
        .map(|t| t.task_type.len())
        .max()
        .unwrap_or(0)
        .max(headers[1].len());
    let date_width = 10;
    let days_width = headers[4].len();
    let done_width = headers[5].len();
    let name_width = names
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max(headers[6].len());

    let mut output = String::new();

    output.push_str(&format!(
        "  {:<id_w$}  {:<type_w$}  {:<date_w$}  {:<date_w$}  {:>days_w$}  {:>done_w$}  {}\n",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        headers[4],
        headers[5],
        headers[6],
        id_w = id_width,
        type_w = type_width,
        date_w = date_width,
        days_w = days_width,
        done_w = done_width,
    ));

    output.push_str(&format!(
        "  {:->id_w$}  {:->type_w$}  {:->date_w$}  {:->date_w$}  {:->days_w$}  {:->done_w$}  {:->name_w$}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        id_w = id_width,
        type_w = type_width,
        date_w = date_width,
        days_w = days_width,
        done_w = done_width,
        name_w = name_width,
    ));

    for (task, name) in tasks.iter().zip(&names) {
        let selected = if task.selected { "*" } else { " " };
        output.push_str(&format!(
            "{} {:<id_w$}  {:<type_w$}  {:<date_w$}  {:<date_w$}  {:>days_w$}  {:>done_w$}  {}\n",
            selected,
            task.id,
            task.task_type,
            task.start,
            task.end,
            task.duration,
            format!("{}%", task.progress),
            name,
            id_w = id_width,
            type_w = type_width,
            date_w = date_width,
            days_w = days_width,
            done_w = done_width,
        ));
    }

    // Remove trailing newline for cleaner output
    output.pop();
    output
}

/// Format initiatives into an aligned table, marking the active one.
pub fn format_initiative_table(initiatives: &[Initiative], current: &str) -> String {
    if initiatives.is_empty() {
        return "No initiatives found.".to_string();
    }

    let id_width = initiatives
        .iter()
        .map(|i| i.id.len())
        .max()
        .unwrap_or(0)
        .max(2);
    let name_width = initiatives
        .iter()
        .map(|i| i.name.chars().count().min(MAX_NAME_WIDTH))
        .max()
        .unwrap_or(0)
        .max(4);

    let mut output = format!(
        "  {:<id_w$}  {:<name_w$}  {}\n  {:->id_w$}  {:->name_w$}  {:->11}\n",
        "ID",
        "Name",
        "Description",
        "",
        "",
        "",
        id_w = id_width,
        name_w = name_width,
    );
    for initiative in initiatives {
        let marker = if initiative.id == current { "*" } else { " " };
        let description = if initiative.description.is_empty() {
            "-"
        } else {
            initiative.description.as_str()
        };
        output.push_str(&format!(
            "{} {:<id_w$}  {}  {}\n",
            marker,
            initiative.id,
            pad(&truncate(&initiative.name, MAX_NAME_WIDTH), name_width),
            description,
            id_w = id_width,
        ));
    }
    output.pop();
    output
}

/// Column of a pixel offset inside a window starting at `from_px`.
fn column_floor(px: i64, from_px: i64) -> i64 {
    (px - from_px).div_euclid(PIXELS_PER_COLUMN)
}

fn column_ceil(px: i64, from_px: i64) -> i64 {
    -(-(px - from_px)).div_euclid(PIXELS_PER_COLUMN)
}

/// Render the timeline as text.
///
/// The chart shows `columns` character columns starting at pixel
/// `from_px`, one column per [`PIXELS_PER_COLUMN`] pixels. Bars are drawn
/// with the completed share filled, milestones as a diamond, and today as
/// a vertical line.
pub fn format_timeline(layout: &TimelineLayout, from_px: i64, columns: usize) -> String {
    let width = columns as i64;
    let today_col = column_floor(layout.today_offset, from_px);
    let today_visible = (0..width).contains(&today_col);

    // Header labels, skipping any that would overlap the previous one
    let mut header = vec![' '; columns];
    let mut next_free = 0i64;
    for cell in &layout.header {
        let col = column_floor(cell.offset, from_px);
        let len = cell.label.chars().count() as i64;
        if col < next_free || col < 0 || col + len > width {
            continue;
        }
        for (i, ch) in cell.label.chars().enumerate() {
            header[(col as usize) + i] = ch;
        }
        next_free = col + len + 1;
    }

    let mut rule = vec!['-'; columns];
    if today_visible {
        rule[today_col as usize] = 'v';
    }

    let mut lines = vec![
        format!(
            "{}{}",
            pad("Task", CHART_NAME_WIDTH),
            header.iter().collect::<String>()
        ),
        format!(
            "{}{}",
            "-".repeat(CHART_NAME_WIDTH),
            rule.iter().collect::<String>()
        ),
    ];

    for row in &layout.rows {
        let mut cells = vec![' '; columns];
        if today_visible {
            cells[today_col as usize] = TODAY;
        }

        if row.task.is_milestone() {
            let col = column_floor(row.bar.left, from_px);
            if (0..width).contains(&col) {
                cells[col as usize] = MILESTONE;
            }
        } else {
            let start = column_floor(row.bar.left, from_px);
            let end = column_ceil(row.bar.right(), from_px).max(start + 1);
            let span = end - start;
            let done = (span * i64::from(row.task.progress) + 50) / 100;
            for col in start.max(0)..end.min(width) {
                cells[col as usize] = if col - start < done { BAR_DONE } else { BAR_TODO };
            }
        }

        let selected = if row.is_selected { ">" } else { " " };
        let name = name_cell(
            &row.task.name,
            row.depth,
            row.has_children,
            row.is_collapsed,
            CHART_NAME_WIDTH - 2,
        );
        lines.push(format!(
            "{}{}{}",
            selected,
            pad(&name, CHART_NAME_WIDTH - 1),
            cells.iter().collect::<String>()
        ));
    }

    if layout.rows.is_empty() {
        lines.push("No tasks found.".to_string());
    }
    lines.join("\n")
}
