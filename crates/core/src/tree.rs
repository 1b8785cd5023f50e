//! Task hierarchy and visibility.
//!
//! Owns the flat task collection and answers hierarchy questions: which
//! tasks are visible for an initiative under a collapsed-set, which
//! initiative a task belongs to, and whether a reparent would loop.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::error::{GanttError, GanttResult};
use crate::models::Task;

/// A visible row of the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleTask<'a> {
    pub task: &'a Task,
    /// Depth in the tree (0 = root).
    pub depth: usize,
    /// Whether the task has children in the filtered set.
    pub has_children: bool,
    /// Whether the task's children are hidden.
    pub is_collapsed: bool,
}

/// The flat task collection with parent/child navigation.
///
/// Task order is the insertion order and is preserved among siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTree {
    tasks: Vec<Task>,
}

impl TaskTree {
    /// Wrap an existing task list.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// All tasks in collection order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Whether a task with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Direct children of `id`, in collection order.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .iter()
            .filter(move |t| t.parent.as_deref() == Some(id))
    }

    /// Whether `id` has at least one child.
    pub fn has_children(&self, id: &str) -> bool {
        self.children(id).next().is_some()
    }

    /// All descendants of `id` in depth-first pre-order.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if the walk visits more tasks
    /// than exist.
    pub fn descendants(&self, id: &str) -> GanttResult<Vec<&Task>> {
        let mut result = Vec::new();
        let mut stack: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.parent.as_deref() == Some(id))
            .collect();
        stack.reverse();

        while let Some(task) = stack.pop() {
            result.push(task);
            if result.len() > self.tasks.len() {
                return Err(GanttError::CycleDetected {
                    task_id: task.id.clone(),
                });
            }
            let start = stack.len();
            stack.extend(self.children(&task.id));
            stack[start..].reverse();
        }
        Ok(result)
    }

    /// The initiative `task` belongs to.
    ///
    /// Returns the task's own initiative if set, else the nearest
    /// ancestor's, else `None` (including when the parent chain ends at a
    /// missing task).
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if the parent chain loops.
    pub fn resolve_initiative<'a>(&'a self, task: &'a Task) -> GanttResult<Option<&'a str>> {
        let mut current = task;
        let mut steps = 0usize;

        loop {
            if let Some(initiative) = current.initiative_id.as_deref() {
                return Ok(Some(initiative));
            }
            let Some(parent_id) = current.parent.as_deref() else {
                return Ok(None);
            };
            let Some(parent) = self.get(parent_id) else {
                return Ok(None);
            };
            steps += 1;
            if steps > self.tasks.len() {
                return Err(GanttError::CycleDetected {
                    task_id: task.id.clone(),
                });
            }
            current = parent;
        }
    }

    /// Whether `task` belongs to `initiative`.
    ///
    /// Tasks with no resolvable initiative belong everywhere so that
    /// orphans are never hidden.
    pub fn belongs_to(&self, task: &Task, initiative: &str) -> GanttResult<bool> {
        Ok(match self.resolve_initiative(task)? {
            Some(resolved) => resolved == initiative,
            None => true,
        })
    }

    /// Whether making `new_parent` the parent of `task_id` would create a
    /// loop.
    pub fn would_create_cycle(&self, task_id: &str, new_parent: &str) -> bool {
        let mut current = Some(new_parent);
        let mut steps = 0usize;

        while let Some(id) = current {
            if id == task_id {
                return true;
            }
            steps += 1;
            if steps > self.tasks.len() {
                // The existing chain already loops
                return true;
            }
            current = self.get(id).and_then(|t| t.parent.as_deref());
        }
        false
    }

    /// Validate that no task is its own ancestor.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` naming a task on the loop.
    pub fn check_acyclic(&self) -> GanttResult<()> {
        for task in &self.tasks {
            if let Some(parent) = task.parent.as_deref()
                && self.would_create_cycle(&task.id, parent)
            {
                return Err(GanttError::CycleDetected {
                    task_id: task.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Ordered, depth-annotated rows for the task list.
    ///
    /// Tasks are filtered to `active_initiative` (when given), then walked
    /// depth-first from the roots. Roots are tasks without a parent or
    /// whose parent is not part of the filtered set. Children of collapsed
    /// tasks are skipped; sibling order is preserved.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CycleDetected` if resolving an initiative
    /// loops or a parent loop leaves included tasks unreachable from any
    /// root, whether or not anything is collapsed.
    pub fn visible_tasks<'a>(
        &'a self,
        collapsed: &HashSet<String>,
        active_initiative: Option<&str>,
    ) -> GanttResult<Vec<VisibleTask<'a>>> {
        let mut included: Vec<&Task> = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let keep = match active_initiative {
                Some(initiative) => self.belongs_to(task, initiative)?,
                None => true,
            };
            if keep {
                included.push(task);
            }
        }

        let included_ids: HashSet<&str> = included.iter().map(|t| t.id.as_str()).collect();
        let mut children: HashMap<&str, Vec<&Task>> = HashMap::new();
        let mut roots: Vec<&Task> = Vec::new();
        for &task in &included {
            match task.parent.as_deref() {
                Some(parent) if included_ids.contains(parent) => {
                    children.entry(parent).or_default().push(task);
                }
                _ => roots.push(task),
            }
        }

        // Hidden subtrees are still walked so every included task is
        // reached exactly once; a parent loop leaves some unreached.
        let mut result = Vec::with_capacity(included.len());
        let mut reached: HashSet<&str> = HashSet::with_capacity(included.len());
        let mut stack: Vec<(&Task, usize, bool)> =
            roots.iter().rev().map(|t| (*t, 0, false)).collect();

        while let Some((task, depth, hidden)) = stack.pop() {
            if !reached.insert(task.id.as_str()) || reached.len() > self.tasks.len() {
                return Err(GanttError::CycleDetected {
                    task_id: task.id.clone(),
                });
            }
            let kids = children.get(task.id.as_str());
            let is_collapsed = collapsed.contains(&task.id);
            if !hidden {
                result.push(VisibleTask {
                    task,
                    depth,
                    has_children: kids.is_some_and(|k| !k.is_empty()),
                    is_collapsed,
                });
            }
            if let Some(kids) = kids {
                let hide = hidden || is_collapsed;
                stack.extend(kids.iter().rev().map(|child| (*child, depth + 1, hide)));
            }
        }

        if let Some(lost) = included.iter().find(|t| !reached.contains(t.id.as_str())) {
            return Err(GanttError::CycleDetected {
                task_id: lost.id.clone(),
            });
        }

        trace!(
            visible = result.len(),
            total = self.tasks.len(),
            "Computed visible tasks"
        );
        Ok(result)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Task> {
        self.tasks.iter_mut()
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Task) -> bool) {
        self.tasks.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, parent: Option<&str>) -> Task {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut t = Task::new(id, format!("Task {}", id), day, day);
        t.parent = parent.map(str::to_string);
        t
    }

    fn ids(rows: &[VisibleTask<'_>]) -> Vec<(String, usize)> {
        rows.iter()
            .map(|r| (r.task.id.clone(), r.depth))
            .collect()
    }

    /// a
    /// ├── b
    /// │   └── c
    /// └── d
    /// e
    fn sample_tree() -> TaskTree {
        TaskTree::new(vec![
            task("a", None),
            task("b", Some("a")),
            task("e", None),
            task("c", Some("b")),
            task("d", Some("a")),
        ])
    }

    // ========================================
    // visible_tasks
    // ========================================

    #[test]
    fn test_visible_tasks_preorder_with_depth() {
        let tree = sample_tree();
        let rows = tree.visible_tasks(&HashSet::new(), None).unwrap();
        assert_eq!(
            ids(&rows),
            vec![
                ("a".into(), 0),
                ("b".into(), 1),
                ("c".into(), 2),
                ("d".into(), 1),
                ("e".into(), 0)
            ]
        );
        assert!(rows[0].has_children);
        assert!(!rows[2].has_children);
    }

    #[test]
    fn test_collapse_hides_subtree_but_keeps_node() {
        let tree = sample_tree();
        let collapsed: HashSet<String> = ["b".to_string()].into();
        let rows = tree.visible_tasks(&collapsed, None).unwrap();
        let visible: Vec<_> = rows.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(visible, vec!["a", "b", "d", "e"]);
        assert!(rows[1].is_collapsed);
    }

    #[test]
    fn test_collapse_root_hides_all_descendants() {
        let tree = sample_tree();
        let collapsed: HashSet<String> = ["a".to_string()].into();
        let rows = tree.visible_tasks(&collapsed, None).unwrap();
        let visible: Vec<_> = rows.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(visible, vec!["a", "e"]);
    }

    #[test]
    fn test_visible_tasks_filters_by_initiative() {
        let tree = TaskTree::new(vec![
            task("a", None).with_initiative("i1"),
            task("b", Some("a")),
            task("x", None).with_initiative("i2"),
            task("y", Some("x")),
            task("orphan", None),
        ]);
        let rows = tree.visible_tasks(&HashSet::new(), Some("i1")).unwrap();
        let visible: Vec<_> = rows.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(visible, vec!["a", "b", "orphan"]);
    }

    #[test]
    fn test_child_in_other_initiative_becomes_root_of_its_filter() {
        let tree = TaskTree::new(vec![
            task("a", None).with_initiative("i1"),
            task("b", Some("a")).with_initiative("i2"),
        ]);
        let rows = tree.visible_tasks(&HashSet::new(), Some("i2")).unwrap();
        assert_eq!(ids(&rows), vec![("b".into(), 0)]);
    }

    #[test]
    fn test_dangling_parent_is_treated_as_root() {
        let tree = TaskTree::new(vec![task("a", None), task("b", Some("gone"))]);
        let rows = tree.visible_tasks(&HashSet::new(), None).unwrap();
        assert_eq!(ids(&rows), vec![("a".into(), 0), ("b".into(), 0)]);
    }

    #[test]
    fn test_cyclic_initiative_resolution_is_loud() {
        let tree = TaskTree::new(vec![task("a", Some("b")), task("b", Some("a"))]);
        let result = tree.visible_tasks(&HashSet::new(), Some("i1"));
        assert!(matches!(result, Err(GanttError::CycleDetected { .. })));
    }

    #[test]
    fn test_parent_loop_with_own_initiatives_is_loud() {
        let tree = TaskTree::new(vec![
            task("root", None).with_initiative("i1"),
            task("a", Some("b")).with_initiative("i1"),
            task("b", Some("a")).with_initiative("i1"),
        ]);
        for filter in [Some("i1"), None] {
            let result = tree.visible_tasks(&HashSet::new(), filter);
            assert!(
                matches!(result, Err(GanttError::CycleDetected { ref task_id }) if task_id == "a"),
                "filter {:?} gave {:?}",
                filter,
                result.map(|rows| rows.len())
            );
        }
    }

    #[test]
    fn test_parent_loop_under_collapsed_task_is_loud() {
        let tree = TaskTree::new(vec![
            task("root", None),
            task("a", Some("b")),
            task("b", Some("a")),
        ]);
        let collapsed: HashSet<String> = ["root".to_string()].into();
        let result = tree.visible_tasks(&collapsed, None);
        assert!(matches!(result, Err(GanttError::CycleDetected { .. })));
    }

    #[test]
    fn test_collapsed_subtree_is_still_counted() {
        let tree = sample_tree();
        let collapsed: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        let rows = tree.visible_tasks(&collapsed, None).unwrap();
        assert_eq!(ids(&rows), vec![("a".into(), 0), ("e".into(), 0)]);
    }

    // ========================================
    // resolve_initiative
    // ========================================

    #[test]
    fn test_resolve_initiative_walks_ancestors() {
        let tree = TaskTree::new(vec![
            task("a", None).with_initiative("i1"),
            task("b", Some("a")),
            task("c", Some("b")),
        ]);
        let c = tree.get("c").unwrap();
        assert_eq!(tree.resolve_initiative(c).unwrap(), Some("i1"));
    }

    #[test]
    fn test_resolve_initiative_prefers_own() {
        let tree = TaskTree::new(vec![
            task("a", None).with_initiative("i1"),
            task("b", Some("a")).with_initiative("i2"),
        ]);
        let b = tree.get("b").unwrap();
        assert_eq!(tree.resolve_initiative(b).unwrap(), Some("i2"));
    }

    #[test]
    fn test_resolve_initiative_none_for_orphans() {
        let tree = TaskTree::new(vec![task("a", None), task("b", Some("missing"))]);
        assert_eq!(tree.resolve_initiative(tree.get("a").unwrap()).unwrap(), None);
        assert_eq!(tree.resolve_initiative(tree.get("b").unwrap()).unwrap(), None);
    }

    // ========================================
    // hierarchy helpers
    // ========================================

    #[test]
    fn test_has_children_and_descendants() {
        let tree = sample_tree();
        assert!(tree.has_children("a"));
        assert!(!tree.has_children("e"));
        let desc: Vec<_> = tree
            .descendants("a")
            .unwrap()
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(desc, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_would_create_cycle() {
        let tree = sample_tree();
        assert!(tree.would_create_cycle("a", "c"));
        assert!(tree.would_create_cycle("b", "b"));
        assert!(!tree.would_create_cycle("e", "c"));
        assert!(!tree.would_create_cycle("d", "b"));
    }

    #[test]
    fn test_check_acyclic() {
        assert!(sample_tree().check_acyclic().is_ok());
        let looped = TaskTree::new(vec![task("a", Some("c")), task("b", Some("a")), task("c", Some("b"))]);
        assert!(matches!(
            looped.check_acyclic(),
            Err(GanttError::CycleDetected { .. })
        ));
    }
}
