//! Timeline panel: zoom header, today marker, and one bar per visible row.
//!
//! The engine lays bars out in pixels; the terminal draws one column per
//! [`PIXELS_PER_COLUMN`] pixels. The panel shows the columns from a
//! horizontal scroll position onwards.

use gantt_core::{RowLayout, TimelineLayout};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Engine pixels drawn in one terminal column.
pub const PIXELS_PER_COLUMN: i64 = 10;

/// Rows taken by the header and the rule under it.
pub const HEADER_ROWS: usize = 2;

const DONE_CHAR: char = '█';
const TODO_CHAR: char = '░';
const MILESTONE_CHAR: char = '◆';
const TODAY_CHAR: char = '│';
const TODAY_RULE_CHAR: char = '▼';
const RULE_CHAR: char = '─';
const TICK_CHAR: char = '┬';

/// One drawn cell.
type Cell = (char, Style);

/// Terminal column of a pixel offset, rounding towards the left.
pub fn column_of(px: i64) -> i64 {
    px.div_euclid(PIXELS_PER_COLUMN)
}

/// Number of columns needed for the whole scrollable range.
pub fn total_columns(layout: &TimelineLayout) -> i64 {
    (layout.total_width + PIXELS_PER_COLUMN - 1).div_euclid(PIXELS_PER_COLUMN)
}

/// Column span `[start, end)` covered by a row's bar.
///
/// Every bar is at least one column wide, so a one-day task stays
/// visible at the coarsest zoom.
pub fn bar_columns(row: &RowLayout) -> (i64, i64) {
    let start = column_of(row.bar.left);
    let end = column_of(row.bar.right() + PIXELS_PER_COLUMN - 1);
    (start, end.max(start + 1))
}

/// Parse a `#rrggbb` bar color.
pub fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn bar_color(row: &RowLayout) -> Color {
    parse_hex_color(&row.task.color).unwrap_or(Color::Blue)
}

/// Merge runs of equally styled cells into spans.
fn cells_to_line(cells: Vec<Cell>) -> Line<'static> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;

    for (ch, style) in cells {
        if current.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut text), current.unwrap_or_default()));
        }
        current = Some(style);
        text.push(ch);
    }
    if let Some(style) = current {
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

/// Column of the today marker inside the viewport, if visible.
fn today_column(layout: &TimelineLayout, first_col: i64, width: usize) -> Option<usize> {
    let col = column_of(layout.today_offset) - first_col;
    usize::try_from(col).ok().filter(|&c| c < width)
}

/// Header labels placed at their cell starts.
///
/// A label that would overlap the previous one is skipped.
pub fn build_header_line(layout: &TimelineLayout, first_col: i64, width: usize) -> Line<'static> {
    let mut cells: Vec<Cell> = vec![(' ', Style::default()); width];
    let mut free_from = 0usize;

    for header in &layout.header {
        let Ok(col) = usize::try_from(column_of(header.offset) - first_col) else {
            continue;
        };
        if col >= width || col < free_from {
            continue;
        }
        let style = if header.weekend {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let mut end = col;
        for (slot, ch) in cells[col..].iter_mut().zip(header.label.chars()) {
            *slot = (ch, style);
            end += 1;
        }
        free_from = end + 1;
    }

    cells_to_line(cells)
}

/// Rule under the header with ticks at cell starts and the today marker.
pub fn build_rule_line(layout: &TimelineLayout, first_col: i64, width: usize) -> Line<'static> {
    let rule = Style::default().fg(Color::DarkGray);
    let mut cells: Vec<Cell> = vec![(RULE_CHAR, rule); width];

    for header in &layout.header {
        if let Ok(col) = usize::try_from(column_of(header.offset) - first_col)
            && col < width
        {
            cells[col] = (TICK_CHAR, rule);
        }
    }
    if let Some(col) = today_column(layout, first_col, width) {
        cells[col] = (TODAY_RULE_CHAR, Style::default().fg(Color::Red));
    }

    cells_to_line(cells)
}

/// One row of the chart: the bar with its progress fill and the today line.
pub fn build_bar_line(
    layout: &TimelineLayout,
    row: &RowLayout,
    first_col: i64,
    width: usize,
) -> Line<'static> {
    let mut cells: Vec<Cell> = vec![(' ', Style::default()); width];
    if let Some(col) = today_column(layout, first_col, width) {
        cells[col] = (TODAY_CHAR, Style::default().fg(Color::Red));
    }

    let mut style = Style::default().fg(bar_color(row));
    if row.is_selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if row.has_children {
        style = style.add_modifier(Modifier::BOLD);
    }

    let (start, end) = bar_columns(row);
    if row.task.is_milestone() {
        if let Ok(col) = usize::try_from(start - first_col)
            && col < width
        {
            cells[col] = (MILESTONE_CHAR, style);
        }
        return cells_to_line(cells);
    }

    let span = end - start;
    let done = span * i64::from(row.task.progress) / 100;
    for col in start..end {
        let Ok(index) = usize::try_from(col - first_col) else {
            continue;
        };
        if index >= width {
            break;
        }
        let ch = if col - start < done { DONE_CHAR } else { TODO_CHAR };
        cells[index] = (ch, style);
    }

    cells_to_line(cells)
}

/// Render the timeline panel.
///
/// # Arguments
///
/// * `layout` - The laid out chart
/// * `first_col` - Horizontal scroll position in columns
/// * `first_row` - Index of the first row shown
pub fn render_timeline_view(
    frame: &mut Frame,
    area: Rect,
    layout: &TimelineLayout,
    first_col: i64,
    first_row: usize,
) {
    let block = Block::default()
        .title(format!(" Timeline ({}) ", layout.zoom))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    let width = usize::from(inner.width);
    let body_height = usize::from(inner.height).saturating_sub(HEADER_ROWS);

    let mut lines = vec![
        build_header_line(layout, first_col, width),
        build_rule_line(layout, first_col, width),
    ];
    lines.extend(
        layout
            .rows
            .iter()
            .skip(first_row)
            .take(body_height)
            .map(|row| build_bar_line(layout, row, first_col, width)),
    );

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
