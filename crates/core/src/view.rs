//! Presentation state persisted alongside the tasks.
//!
//! Kept apart from the task model: which tasks are collapsed, the zoom
//! level, and the selected task.

use std::collections::HashSet;

use crate::zoom::ZoomLevel;

/// Collapsed-set, zoom level, and selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    collapsed: HashSet<String>,
    zoom: ZoomLevel,
    selected: Option<String>,
}

impl ViewState {
    /// Create a view state with nothing collapsed and day zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored parts.
    pub fn from_parts(
        collapsed: impl IntoIterator<Item = String>,
        zoom: ZoomLevel,
        selected: Option<String>,
    ) -> Self {
        Self {
            collapsed: collapsed.into_iter().collect(),
            zoom,
            selected,
        }
    }

    /// Ids whose children are hidden.
    pub fn collapsed(&self) -> &HashSet<String> {
        &self.collapsed
    }

    /// Check if a task's children are hidden.
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    /// Toggle a task's collapsed state; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.to_string());
            true
        }
    }

    /// Show every task's children.
    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Collapse each of the given ids.
    pub fn collapse_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.collapsed.extend(ids.into_iter().map(str::to_string));
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.zoom = zoom;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_selected(&mut self, id: Option<String>) {
        self.selected = id;
    }

    /// Drop every reference to a removed task.
    pub fn forget(&mut self, id: &str) {
        self.collapsed.remove(id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
    }

    /// Drop references to ids for which `exists` is false.
    pub fn retain_known(&mut self, exists: impl Fn(&str) -> bool) {
        self.collapsed.retain(|id| exists(id));
        if let Some(selected) = &self.selected
            && !exists(selected)
        {
            self.selected = None;
        }
    }

    /// Collapsed ids in a stable order for serialization.
    pub fn collapsed_sorted(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.collapsed.iter().cloned().collect();
        ids.sort();
        ids
    }
}
