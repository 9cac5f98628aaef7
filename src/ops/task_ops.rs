use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::filter::TaskFilter;
use crate::model::task::{
    Page, StatusCounts, Task, TaskCreate, TaskStats, TaskStatus, TaskUpdate,
};
use crate::util::dates::end_of_local_day;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("ambiguous task id {prefix}: matches {count} tasks")]
    Ambiguous { prefix: String, count: usize },
    #[error("title is required")]
    EmptyTitle,
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Set status, stamping `completed_at` on entering done and clearing it on
/// leaving done
pub fn set_status(task: &mut Task, status: TaskStatus, now: DateTime<Utc>) {
    if task.status == status {
        return;
    }
    task.status = status;
    task.completed_at = (status == TaskStatus::Done).then_some(now);
    task.updated_at = Some(now);
}

/// Cycle status: todo → doing → done → todo
pub fn cycle_status(task: &mut Task, now: DateTime<Utc>) {
    let next = match task.status {
        TaskStatus::Todo => TaskStatus::Doing,
        TaskStatus::Doing => TaskStatus::Done,
        TaskStatus::Done => TaskStatus::Todo,
    };
    set_status(task, next, now);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a new task after every existing one. Returns its id.
pub fn create_task(
    tasks: &mut Vec<Task>,
    input: TaskCreate,
    now: DateTime<Utc>,
) -> Result<Uuid, TaskError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let order = tasks.iter().map(|t| t.order).max().map_or(0, |m| m + 1);
    let task = Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: normalize_text(input.description),
        status: input.status,
        priority: input.priority,
        due_date: input.due_date,
        completed_at: (input.status == TaskStatus::Done).then_some(now),
        order,
        created_at: now,
        updated_at: None,
    };
    let id = task.id;
    tracing::info!(task = %id, title = %task.title, "task created");
    tasks.push(task);
    Ok(id)
}

/// Apply a partial update
pub fn update_task(
    tasks: &mut [Task],
    id: Uuid,
    update: TaskUpdate,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

    if let Some(title) = update.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        task.title = title.to_string();
    }
    if let Some(description) = update.description {
        task.description = normalize_text(description);
    }
    if let Some(priority) = update.priority {
        task.priority = priority;
    }
    if let Some(due_date) = update.due_date {
        task.due_date = due_date;
    }
    if let Some(order) = update.order {
        task.order = order;
    }
    if let Some(status) = update.status {
        set_status(task, status, now);
    }
    task.updated_at = Some(now);
    tracing::info!(task = %id, "task updated");
    Ok(())
}

pub fn delete_task(tasks: &mut Vec<Task>, id: Uuid) -> Result<Task, TaskError> {
    let idx = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let task = tasks.remove(idx);
    tracing::info!(task = %id, "task deleted");
    Ok(task)
}

// ---------------------------------------------------------------------------
// Lookup and listing
// ---------------------------------------------------------------------------

/// Resolve a full id or a unique prefix of its simple (hyphenless) form
pub fn resolve_id(tasks: &[Task], query: &str) -> Result<Uuid, TaskError> {
    if let Ok(id) = Uuid::parse_str(query)
        && tasks.iter().any(|t| t.id == id)
    {
        return Ok(id);
    }
    let prefix = query.trim().replace('-', "").to_ascii_lowercase();
    if prefix.is_empty() {
        return Err(TaskError::NotFound(query.to_string()));
    }
    let matches: Vec<Uuid> = tasks
        .iter()
        .filter(|t| t.id.simple().to_string().starts_with(&prefix))
        .map(|t| t.id)
        .collect();
    match matches.as_slice() {
        [] => Err(TaskError::NotFound(query.to_string())),
        [id] => Ok(*id),
        _ => Err(TaskError::Ambiguous {
            prefix: query.to_string(),
            count: matches.len(),
        }),
    }
}

pub fn find_task(tasks: &[Task], id: Uuid) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Filter, order by (`order`, `created_at`), and cut one page
pub fn list_tasks(tasks: &[Task], filter: &TaskFilter, skip: usize, limit: usize) -> Page<Task> {
    let search = filter.search_matcher();
    let mut matched: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.matches(t, search.as_ref()))
        .collect();
    // Open tasks first, then manual order
    matched.sort_by_key(|t| (t.status == TaskStatus::Done, t.order, t.created_at));

    let total = matched.len();
    let items: Vec<Task> = matched.into_iter().skip(skip).take(limit).cloned().collect();
    Page {
        has_more: skip + items.len() < total,
        items,
        total,
        skip,
        limit,
    }
}

// ---------------------------------------------------------------------------
// Today and stats
// ---------------------------------------------------------------------------

/// Open tasks due before the end of today (overdue included) or without a
/// due date, most urgent first, then by manual order.
pub fn today_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<Task> {
    let end = end_of_local_day(now);
    let mut today: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .filter(|t| t.due_date.is_none_or(|due| due < end))
        .collect();
    today.sort_by_key(|t| (t.priority, t.order, t.created_at));
    today.into_iter().cloned().collect()
}

pub fn stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let mut by_status = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => by_status.todo += 1,
            TaskStatus::Doing => by_status.doing += 1,
            TaskStatus::Done => by_status.done += 1,
        }
    }
    let total = tasks.len();
    let completion_rate = if total == 0 {
        0.0
    } else {
        (by_status.done as f64 * 1000.0 / total as f64).round() / 10.0
    };
    TaskStats {
        total,
        by_status,
        today_count: today_tasks(tasks, now).len(),
        completion_rate,
    }
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
