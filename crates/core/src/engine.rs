//! The mutation engine.
//!
//! `GanttState` is the single owner of the task collection, the
//! initiatives, and the view state. Every operation validates before it
//! writes, so a returned error always leaves the state untouched.
//! Task-affecting operations refit the timeline bounds in place.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use tracing::{debug, trace, warn};

use crate::bounds::{TimelineBounds, compute_bounds};
use crate::error::{GanttError, GanttResult};
use crate::geometry::drag_result;
use crate::id::IdGenerator;
use crate::layout::{TimelineLayout, build_layout};
use crate::models::{
    DEFAULT_TASK_COLOR, Initiative, Task, TaskDraft, TaskPatch, TaskType, clamp_percent,
};
use crate::tree::{TaskTree, VisibleTask};
use crate::view::ViewState;
use crate::zoom::ZoomLevel;

/// Id of the initiative every fresh state starts with.
pub const DEFAULT_INITIATIVE_ID: &str = "default";

/// Display name of the initiative every fresh state starts with.
pub const DEFAULT_INITIATIVE_NAME: &str = "My Initiative";

/// The editor state: tasks, initiatives, view state, and fitted bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttState {
    tree: TaskTree,
    initiatives: Vec<Initiative>,
    current_initiative_id: String,
    view: ViewState,
    bounds: TimelineBounds,
    today: NaiveDate,
}

static_assertions::assert_impl_all!(GanttState: Send, Sync, Clone);

impl GanttState {
    /// Create an empty state with one default initiative.
    pub fn new(today: NaiveDate) -> Self {
        let tree = TaskTree::default();
        let bounds = compute_bounds(&tree, today, Some(DEFAULT_INITIATIVE_ID));
        Self {
            tree,
            initiatives: vec![Initiative::new(DEFAULT_INITIATIVE_ID, DEFAULT_INITIATIVE_NAME)],
            current_initiative_id: DEFAULT_INITIATIVE_ID.to_string(),
            view: ViewState::new(),
            bounds,
            today,
        }
    }

    /// Assemble a state from restored parts.
    ///
    /// Derived task fields are recomputed, dependencies on missing tasks or
    /// on the task itself are dropped, view references to missing tasks
    /// are dropped, and an unknown current initiative falls back to the
    /// first one. An empty initiative list gets the default initiative.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Validation` for duplicate task ids, blank names
    /// or inverted dates, and `GanttError::CycleDetected` if the parent
    /// graph loops.
    pub fn from_parts(
        mut tasks: Vec<Task>,
        mut initiatives: Vec<Initiative>,
        current_initiative_id: Option<String>,
        mut view: ViewState,
        today: NaiveDate,
    ) -> GanttResult<Self> {
        let mut seen = HashSet::new();
        for task in &tasks {
            if !seen.insert(task.id.clone()) {
                return Err(GanttError::validation(format!(
                    "Duplicate task id '{}'",
                    task.id
                )));
            }
            if task.name.trim().is_empty() {
                return Err(GanttError::validation(format!(
                    "Task '{}' has no name",
                    task.id
                )));
            }
            check_range(task.start_date, task.end_date).map_err(|_| {
                GanttError::validation(format!(
                    "Task '{}' starts on {} after it ends on {}",
                    task.id, task.start_date, task.end_date
                ))
            })?;
        }

        for task in &mut tasks {
            let own_id = task.id.clone();
            let before = task.dependencies.len();
            task.dependencies
                .retain(|dep| *dep != own_id && seen.contains(dep));
            if task.dependencies.len() != before {
                warn!(
                    "Dropped {} unknown dependencies of task {}",
                    before - task.dependencies.len(),
                    own_id
                );
            }
            task.recompute_derived();
        }

        let tree = TaskTree::new(tasks);
        tree.check_acyclic()?;

        if initiatives.is_empty() {
            initiatives.push(Initiative::new(DEFAULT_INITIATIVE_ID, DEFAULT_INITIATIVE_NAME));
        }
        let current_initiative_id = match current_initiative_id {
            Some(id) if initiatives.iter().any(|i| i.id == id) => id,
            _ => initiatives[0].id.clone(),
        };

        view.retain_known(|id| tree.contains(id));
        let bounds = compute_bounds(&tree, today, Some(&current_initiative_id));

        Ok(Self {
            tree,
            initiatives,
            current_initiative_id,
            view,
            bounds,
            today,
        })
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    /// All tasks in collection order, across initiatives.
    pub fn tasks(&self) -> &[Task] {
        self.tree.tasks()
    }

    /// Look up a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tree.get(id)
    }

    pub fn initiatives(&self) -> &[Initiative] {
        &self.initiatives
    }

    pub fn current_initiative_id(&self) -> &str {
        &self.current_initiative_id
    }

    /// The active initiative.
    pub fn current_initiative(&self) -> Option<&Initiative> {
        self.initiative(&self.current_initiative_id)
    }

    pub fn initiative(&self, id: &str) -> Option<&Initiative> {
        self.initiatives.iter().find(|i| i.id == id)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.view.zoom()
    }

    pub fn selected(&self) -> Option<&Task> {
        self.view.selected().and_then(|id| self.tree.get(id))
    }

    pub fn bounds(&self) -> TimelineBounds {
        self.bounds
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Move the reference date and refit the bounds.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.refit();
    }

    /// Visible rows of the active initiative.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if the hierarchy loops.
    pub fn visible_tasks(&self) -> GanttResult<Vec<VisibleTask<'_>>> {
        self.tree
            .visible_tasks(self.view.collapsed(), Some(&self.current_initiative_id))
    }

    /// Render-ready layout of the active initiative.
    ///
    /// # Errors
    ///
    /// Propagates `CycleDetected` and `InvalidGeometry`.
    pub fn layout(&self) -> GanttResult<TimelineLayout> {
        build_layout(
            &self.tree,
            &self.view,
            &self.current_initiative_id,
            self.bounds,
            self.today,
        )
    }

    // ========================================
    // Task mutations
    // ========================================

    /// Create a task in the active initiative.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Validation` for an empty name, inverted dates,
    /// or a self dependency, and `GanttError::NotFound` for an unknown
    /// parent or dependency.
    pub fn create(&mut self, draft: TaskDraft) -> GanttResult<Task> {
        let name = required_name(&draft.name, "Task")?;
        check_range(draft.start_date, draft.end_date)?;
        if let Some(parent) = draft.parent.as_deref()
            && !self.tree.contains(parent)
        {
            return Err(GanttError::task_not_found(parent));
        }
        let dependencies = self.checked_dependencies(None, &draft.dependencies)?;

        let id = IdGenerator::new(&name)
            .find_free(|candidate| self.tree.contains(candidate))
            .ok_or_else(|| GanttError::validation("Could not allocate a unique task id"))?;

        let mut task = Task {
            id,
            name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            duration: 0,
            progress: clamp_percent(draft.progress),
            task_type: draft.task_type,
            parent: draft.parent,
            dependencies,
            resources: clean_resources(draft.resources),
            color: draft
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TASK_COLOR.to_string()),
            is_project: false,
            initiative_id: Some(self.current_initiative_id.clone()),
        };
        task.recompute_derived();

        debug!("Creating task: {} with name: {}", task.id, task.name);
        trace!("Task data: {:?}", task);
        self.tree.push(task.clone());
        self.refit();
        Ok(task)
    }

    /// Merge `patch` into an existing task.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task, parent, or
    /// dependency, `GanttError::Validation` for bad fields, and
    /// `GanttError::CycleDetected` when the new parent is the task itself
    /// or one of its descendants.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> GanttResult<Task> {
        let mut next = self.require(id)?.clone();

        if patch.is_empty() {
            debug!("No updates specified for task: {}", id);
            return Ok(next);
        }

        if let Some(name) = patch.name.as_deref() {
            next.name = required_name(name, "Task")?;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        check_range(next.start_date, next.end_date)?;
        if let Some(task_type) = patch.task_type {
            next.task_type = task_type;
        }
        if let Some(progress) = patch.progress {
            next.progress = clamp_percent(progress);
        }
        if let Some(parent) = patch.parent {
            if let Some(parent_id) = parent.as_deref() {
                if !self.tree.contains(parent_id) {
                    return Err(GanttError::task_not_found(parent_id));
                }
                if self.tree.would_create_cycle(id, parent_id) {
                    return Err(GanttError::CycleDetected {
                        task_id: id.to_string(),
                    });
                }
            }
            next.parent = parent;
        }
        if let Some(dependencies) = patch.dependencies.as_deref() {
            next.dependencies = self.checked_dependencies(Some(id), dependencies)?;
        }
        if let Some(resources) = patch.resources {
            next.resources = clean_resources(resources);
        }
        if let Some(color) = patch.color
            && !color.trim().is_empty()
        {
            next.color = color;
        }
        next.recompute_derived();

        debug!("Updating task: {}", id);
        self.replace(next.clone())?;
        self.refit();
        Ok(next)
    }

    /// Remove a single task.
    ///
    /// Children move to the top level and keep the initiative they
    /// resolved to. References from other tasks' dependencies and from
    /// the view state are dropped.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task and
    /// `GanttError::CycleDetected` if the task's ancestry loops.
    pub fn delete(&mut self, id: &str) -> GanttResult<()> {
        let removed = self.require(id)?;
        let inherited = self
            .tree
            .resolve_initiative(removed)?
            .map(str::to_string);

        debug!("Deleting task: {}", id);
        for task in self.tree.iter_mut() {
            if task.parent.as_deref() == Some(id) {
                task.parent = None;
                if task.initiative_id.is_none() {
                    task.initiative_id = inherited.clone();
                }
                task.recompute_derived();
            }
            task.dependencies.retain(|dep| dep != id);
        }
        self.tree.retain(|t| t.id != id);
        self.view.forget(id);
        self.refit();
        Ok(())
    }

    /// Remove a task together with all of its descendants.
    ///
    /// Returns the removed ids, the task itself first.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task and
    /// `GanttError::CycleDetected` if the subtree loops.
    pub fn delete_cascade(&mut self, id: &str) -> GanttResult<Vec<String>> {
        self.require(id)?;
        let mut removed = vec![id.to_string()];
        removed.extend(self.tree.descendants(id)?.into_iter().map(|t| t.id.clone()));

        debug!("Deleting task: {} with {} descendants", id, removed.len() - 1);
        let ids: HashSet<String> = removed.iter().cloned().collect();
        self.remove_tasks(&ids);
        Ok(removed)
    }

    /// Reschedule a task to `new_start` spanning `duration_days` days.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound`, `GanttError::NotDraggable` for
    /// milestones, `GanttError::Validation` for a duration below one day,
    /// and `GanttError::InvalidGeometry` if the end date leaves the
    /// calendar.
    pub fn reposition_by_drag(
        &mut self,
        id: &str,
        new_start: NaiveDate,
        duration_days: i64,
    ) -> GanttResult<Task> {
        let task = self.require(id)?;
        if !task.task_type.is_draggable() {
            return Err(GanttError::NotDraggable {
                task_id: id.to_string(),
            });
        }
        if duration_days < 1 {
            return Err(GanttError::validation(format!(
                "Duration must be at least one day, got {}",
                duration_days
            )));
        }
        let new_end = Duration::try_days(duration_days - 1)
            .and_then(|span| new_start.checked_add_signed(span))
            .ok_or_else(|| {
                GanttError::geometry(format!(
                    "{} days from {} leaves the calendar",
                    duration_days, new_start
                ))
            })?;

        let mut next = task.clone();
        next.start_date = new_start;
        next.end_date = new_end;
        next.recompute_derived();

        debug!(
            "Repositioning task: {} to {}..{} ({} days)",
            id, new_start, new_end, next.duration
        );
        self.replace(next.clone())?;
        self.refit();
        Ok(next)
    }

    /// Apply a dropped bar at `left_px` with `width_px`, measured in the
    /// current zoom against the current bounds.
    ///
    /// # Errors
    ///
    /// Same as [`GanttState::reposition_by_drag`].
    pub fn apply_drag(&mut self, id: &str, left_px: i64, width_px: i64) -> GanttResult<Task> {
        self.require(id)?;
        let (new_start, days) = drag_result(
            left_px,
            width_px,
            self.bounds.start,
            self.view.zoom().day_width(),
        )?;
        self.reposition_by_drag(id, new_start, days)
    }

    /// Set a task's progress, clamped to `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task.
    pub fn set_progress(&mut self, id: &str, percent: i64) -> GanttResult<Task> {
        let mut next = self.require(id)?.clone();
        next.progress = clamp_percent(percent);
        debug!("Setting progress of task: {} to {}%", id, next.progress);
        self.replace(next.clone())?;
        Ok(next)
    }

    /// Set a task's progress to 100.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task.
    pub fn mark_complete(&mut self, id: &str) -> GanttResult<Task> {
        self.set_progress(id, 100)
    }

    // ========================================
    // View state
    // ========================================

    /// Toggle whether a task's children are hidden; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task.
    pub fn toggle_collapse(&mut self, id: &str) -> GanttResult<bool> {
        self.require(id)?;
        let collapsed = self.view.toggle(id);
        trace!("Task {} collapsed: {}", id, collapsed);
        Ok(collapsed)
    }

    /// Show all children.
    pub fn expand_all(&mut self) {
        self.view.expand_all();
    }

    /// Collapse every summary task.
    pub fn collapse_all(&mut self) {
        let summaries = self
            .tree
            .tasks()
            .iter()
            .filter(|t| t.task_type == TaskType::Summary)
            .map(|t| t.id.as_str());
        self.view.collapse_many(summaries);
    }

    /// Select a task, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown task.
    pub fn select(&mut self, id: Option<&str>) -> GanttResult<()> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.view.set_selected(id.map(str::to_string));
        Ok(())
    }

    /// Change the zoom level. Bounds are left as they are.
    pub fn set_zoom(&mut self, zoom: ZoomLevel) {
        debug!("Setting zoom to {}", zoom);
        self.view.set_zoom(zoom);
    }

    // ========================================
    // Initiatives
    // ========================================

    /// Add an initiative. The active initiative does not change.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::Validation` for an empty name.
    pub fn create_initiative(&mut self, name: &str, description: &str) -> GanttResult<Initiative> {
        let name = required_name(name, "Initiative")?;
        let id = IdGenerator::new(&name)
            .find_free(|candidate| self.initiative(candidate).is_some())
            .ok_or_else(|| GanttError::validation("Could not allocate a unique initiative id"))?;

        let initiative = Initiative::new(id, name).with_description(description.trim());
        debug!("Creating initiative: {} with name: {}", initiative.id, initiative.name);
        self.initiatives.push(initiative.clone());
        Ok(initiative)
    }

    /// Rename an initiative or change its description.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown initiative and
    /// `GanttError::Validation` for an empty name.
    pub fn update_initiative(
        &mut self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> GanttResult<Initiative> {
        let name = name.map(|n| required_name(n, "Initiative")).transpose()?;
        let initiative = self
            .initiatives
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| GanttError::initiative_not_found(id))?;

        if let Some(name) = name {
            initiative.name = name;
        }
        if let Some(description) = description {
            initiative.description = description.trim().to_string();
        }
        debug!("Updating initiative: {}", id);
        Ok(initiative.clone())
    }

    /// Make `id` the active initiative and refit the bounds to it.
    ///
    /// A selection outside the new initiative is cleared.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown initiative.
    pub fn switch_initiative(&mut self, id: &str) -> GanttResult<()> {
        if self.initiative(id).is_none() {
            return Err(GanttError::initiative_not_found(id));
        }
        debug!("Switching to initiative: {}", id);
        self.current_initiative_id = id.to_string();

        let keep_selection = match self.selected() {
            Some(task) => self.tree.belongs_to(task, id)?,
            None => true,
        };
        if !keep_selection {
            self.view.set_selected(None);
        }
        self.refit();
        Ok(())
    }

    /// Delete an initiative and every task that resolves to it.
    ///
    /// Returns the removed task ids. If the active initiative is deleted,
    /// the first remaining one becomes active.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::NotFound` for an unknown initiative,
    /// `GanttError::LastInitiative` when it is the only one, and
    /// `GanttError::CycleDetected` if a task's ancestry loops.
    pub fn delete_initiative(&mut self, id: &str) -> GanttResult<Vec<String>> {
        if self.initiative(id).is_none() {
            return Err(GanttError::initiative_not_found(id));
        }
        if self.initiatives.len() == 1 {
            return Err(GanttError::LastInitiative {
                initiative_id: id.to_string(),
            });
        }

        let mut doomed = Vec::new();
        for task in self.tree.tasks() {
            if self.tree.resolve_initiative(task)? == Some(id) {
                doomed.push(task.id.clone());
            }
        }

        debug!("Deleting initiative: {} with {} tasks", id, doomed.len());
        self.initiatives.retain(|i| i.id != id);
        if self.current_initiative_id == id
            && let Some(first) = self.initiatives.first()
        {
            self.current_initiative_id = first.id.clone();
        }
        let ids: HashSet<String> = doomed.iter().cloned().collect();
        self.remove_tasks(&ids);
        Ok(doomed)
    }

    // ========================================
    // Internals
    // ========================================

    fn require(&self, id: &str) -> GanttResult<&Task> {
        self.tree
            .get(id)
            .ok_or_else(|| GanttError::task_not_found(id))
    }

    fn replace(&mut self, task: Task) -> GanttResult<()> {
        let slot = self
            .tree
            .get_mut(&task.id)
            .ok_or_else(|| GanttError::task_not_found(task.id.clone()))?;
        *slot = task;
        Ok(())
    }

    fn remove_tasks(&mut self, ids: &HashSet<String>) {
        self.tree.retain(|t| !ids.contains(&t.id));
        for task in self.tree.iter_mut() {
            task.dependencies.retain(|dep| !ids.contains(dep));
            if task.parent.as_ref().is_some_and(|p| ids.contains(p)) {
                task.parent = None;
                task.recompute_derived();
            }
        }
        for id in ids {
            self.view.forget(id);
        }
        self.refit();
    }

    /// Deduplicate and validate dependency ids for `owner`.
    fn checked_dependencies(&self, owner: Option<&str>, ids: &[String]) -> GanttResult<Vec<String>> {
        let mut result: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.trim();
            if owner == Some(id) {
                return Err(GanttError::validation("A task cannot depend on itself"));
            }
            if !self.tree.contains(id) {
                return Err(GanttError::task_not_found(id));
            }
            if !result.iter().any(|existing| existing == id) {
                result.push(id.to_string());
            }
        }
        Ok(result)
    }

    fn refit(&mut self) {
        self.bounds = compute_bounds(&self.tree, self.today, Some(&self.current_initiative_id));
    }
}

fn required_name(raw: &str, kind: &str) -> GanttResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(GanttError::validation(format!("{} name is required", kind)));
    }
    Ok(name.to_string())
}

fn check_range(start: NaiveDate, end: NaiveDate) -> GanttResult<()> {
    if start > end {
        return Err(GanttError::validation("Start date cannot be after end date"));
    }
    Ok(())
}

fn clean_resources(resources: Vec<String>) -> Vec<String> {
    resources
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}
