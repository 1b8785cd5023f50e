//! Data models for the Gantt engine
//!
//! Defines the task and initiative records, the draft/patch inputs used by
//! the mutation engine, and the date encoding shared with the snapshot
//! document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default bar color for new tasks.
pub const DEFAULT_TASK_COLOR: &str = "#2196F3";

/// Task type
///
/// Each type carries a fixed capability set:
/// summary rolls up children, task is a plain bar, milestone is a
/// zero-duration marker that cannot be dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Summary,
    #[default]
    Task,
    Milestone,
}

impl TaskType {
    /// Returns the string representation used in the snapshot document
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Summary => "summary",
            TaskType::Task => "task",
            TaskType::Milestone => "milestone",
        }
    }

    /// Whether tasks of this type usually group children.
    pub fn has_children_rollup(&self) -> bool {
        matches!(self, TaskType::Summary)
    }

    /// Whether bars of this type can be moved or resized by dragging.
    pub fn is_draggable(&self) -> bool {
        !matches!(self, TaskType::Milestone)
    }

    /// Whether this type is drawn as a fixed-width marker instead of a bar.
    pub fn is_zero_width(&self) -> bool {
        matches!(self, TaskType::Milestone)
    }

    /// Inclusive day count for a date range of this type.
    ///
    /// Milestones always have a duration of `0`.
    pub fn duration_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            TaskType::Milestone => 0,
            _ => (end - start).num_days() + 1,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(TaskType::Summary),
            "task" => Ok(TaskType::Task),
            "milestone" => Ok(TaskType::Milestone),
            _ => Err(format!(
                "invalid task type '{}'. Valid values: summary, task, milestone",
                s
            )),
        }
    }
}

/// One schedulable unit on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
    /// Derived inclusive day count (0 for milestones).
    #[serde(default)]
    pub duration: i64,
    /// Completion percent, always within `0..=100`.
    #[serde(default, deserialize_with = "clamped_percent")]
    pub progress: u8,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub parent: Option<String>,
    /// Display-only links to other tasks.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
    /// Derived: top-level summary tasks are initiative entry points.
    #[serde(default)]
    pub is_project: bool,
    #[serde(default)]
    pub initiative_id: Option<String>,
}

fn default_color() -> String {
    DEFAULT_TASK_COLOR.to_string()
}

impl Task {
    /// Create a plain task spanning the given dates.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let mut task = Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            duration: 0,
            progress: 0,
            task_type: TaskType::Task,
            parent: None,
            dependencies: Vec::new(),
            resources: Vec::new(),
            color: default_color(),
            is_project: false,
            initiative_id: None,
        };
        task.recompute_derived();
        task
    }

    /// Set the task type.
    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self.recompute_derived();
        self
    }

    /// Set the parent task.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self.recompute_derived();
        self
    }

    /// Set the owning initiative.
    pub fn with_initiative(mut self, initiative_id: impl Into<String>) -> Self {
        self.initiative_id = Some(initiative_id.into());
        self
    }

    /// Add a dependency on another task.
    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Set the progress percent (clamped).
    pub fn with_progress(mut self, percent: i64) -> Self {
        self.progress = clamp_percent(percent);
        self
    }

    /// Recompute `duration` and `is_project` from the stored fields.
    pub fn recompute_derived(&mut self) {
        self.duration = self
            .task_type
            .duration_between(self.start_date, self.end_date);
        self.is_project = self.parent.is_none() && self.task_type == TaskType::Summary;
    }

    /// Whether this task is a zero-duration milestone.
    pub fn is_milestone(&self) -> bool {
        self.task_type == TaskType::Milestone
    }

    /// Whether the task is fully complete.
    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }
}

/// A named grouping of tasks (workspace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Initiative {
    /// Create an initiative stamped with the current time.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub task_type: TaskType,
    /// Raw percent, clamped on creation.
    pub progress: i64,
    /// Parent for add-child; `None` creates a top-level task.
    pub parent: Option<String>,
    pub dependencies: Vec<String>,
    pub resources: Vec<String>,
    pub color: Option<String>,
}

impl TaskDraft {
    /// Start a draft for a plain task.
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            task_type: TaskType::Task,
            progress: 0,
            parent: None,
            dependencies: Vec::new(),
            resources: Vec::new(),
            color: None,
        }
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_progress(mut self, percent: i64) -> Self {
        self.progress = percent;
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update for an existing task.
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub task_type: Option<TaskType>,
    pub progress: Option<i64>,
    /// `Some(None)` moves the task to the top level.
    pub parent: Option<Option<String>>,
    pub dependencies: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
    pub color: Option<String>,
}

impl TaskPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_progress(mut self, percent: i64) -> Self {
        self.progress = Some(percent);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(Some(parent.into()));
        self
    }

    /// Detach the task from its parent.
    pub fn to_top_level(mut self) -> Self {
        self.parent = Some(None);
        self
    }

    pub fn with_dependencies(mut self, ids: Vec<String>) -> Self {
        self.dependencies = Some(ids);
        self
    }

    pub fn with_resources(mut self, names: Vec<String>) -> Self {
        self.resources = Some(names);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamp a raw percent into `0..=100`.
pub fn clamp_percent(percent: i64) -> u8 {
    percent.clamp(0, 100) as u8
}

fn clamped_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Ok(0);
    }
    Ok(clamp_percent(raw.round() as i64))
}

/// Calendar date encoding for the snapshot document.
///
/// Dates are written as `YYYY-MM-DD`. Reading also accepts full RFC 3339
/// timestamps, which older documents stored; the UTC calendar day is kept.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const DATE_FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }

    /// Parse a date from either a plain date or a timestamp string.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.date())
    }
}
