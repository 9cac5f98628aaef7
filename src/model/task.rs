use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    /// Wire / config name
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    /// Human label
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To do",
            TaskStatus::Doing => "Doing",
            TaskStatus::Done => "Done",
        }
    }

    /// Short marker used in list rows
    pub fn marker(self) -> &'static str {
        match self {
            TaskStatus::Todo => "[ ]",
            TaskStatus::Doing => "[>]",
            TaskStatus::Done => "[x]",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            "doing" => Some(TaskStatus::Doing),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Task priority. Ordering is by urgency: `High < Medium < Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::High => "High",
            TaskPriority::Medium => "Medium",
            TaskPriority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<TaskPriority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(TaskPriority::High),
            "medium" => Some(TaskPriority::Medium),
            "low" => Some(TaskPriority::Low),
            _ => None,
        }
    }
}

/// A stored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Manual sort position (ascending)
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Short form of the id shown in lists and accepted by the CLI
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves a field unchanged. The nested options on
/// `description` and `due_date` distinguish "clear" (`Some(None)`) from "keep".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub order: Option<i64>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
    pub has_more: bool,
}

/// Counts shown by `wl stats` and the TUI header
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub by_status: StatusCounts,
    /// Tasks in the today list
    pub today_count: usize,
    /// Percent done, one decimal place; 0 with no tasks
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items (at least 1)
    pub fn page_count(&self) -> usize {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(self.limit).max(1)
    }

    /// Zero-based page index of this page
    pub fn page_index(&self) -> usize {
        if self.limit == 0 { 0 } else { self.skip / self.limit }
    }
}
