//! Keyboard input for the editor.
//!
//! Keys are polled with a timeout and translated into [`Action`]s so the
//! application logic never looks at raw key codes.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::TuiResult;

/// Something the user asked the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectNext,
    SelectPrevious,
    ToggleCollapse,
    CycleZoom,
    ScrollLeft,
    ScrollRight,
    /// Shift the selected task one day earlier.
    MoveEarlier,
    /// Shift the selected task one day later.
    MoveLater,
    /// Add a day to the selected task.
    Lengthen,
    /// Remove a day from the selected task.
    Shorten,
    Complete,
    Delete,
    ExpandAll,
    CollapseAll,
    NextInitiative,
    Quit,
}

/// Poll for keyboard events with a timeout.
///
/// Returns `Some(KeyEvent)` if a key was pressed within the timeout,
/// or `None` if no key was pressed. Key releases are ignored.
pub fn poll_key(timeout: Duration) -> TuiResult<Option<KeyEvent>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(Some(key));
    }
    Ok(None)
}

/// Check if the key event represents a quit command.
///
/// Returns `true` for 'q' key or Ctrl+C.
pub fn is_quit(key: &KeyEvent) -> bool {
    matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            ..
        } | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
    )
}

/// The typed character, if no modifier other than Shift is held.
fn plain_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            Some(c)
        }
        _ => None,
    }
}

/// Translate a key into an action.
pub fn action_for(key: &KeyEvent) -> Option<Action> {
    if is_quit(key) {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Down => return Some(Action::SelectNext),
        KeyCode::Up => return Some(Action::SelectPrevious),
        KeyCode::Left => return Some(Action::ScrollLeft),
        KeyCode::Right => return Some(Action::ScrollRight),
        KeyCode::Enter => return Some(Action::ToggleCollapse),
        _ => {}
    }

    let action = match plain_char(key)? {
        'j' => Action::SelectNext,
        'k' => Action::SelectPrevious,
        ' ' => Action::ToggleCollapse,
        'z' => Action::CycleZoom,
        'h' => Action::ScrollLeft,
        'l' => Action::ScrollRight,
        '<' => Action::MoveEarlier,
        '>' => Action::MoveLater,
        '+' | '=' => Action::Lengthen,
        '-' => Action::Shorten,
        'c' => Action::Complete,
        'd' => Action::Delete,
        'E' => Action::ExpandAll,
        'C' => Action::CollapseAll,
        'i' => Action::NextInitiative,
        _ => return None,
    };
    Some(action)
}
