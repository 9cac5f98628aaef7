use crate::model::task::{Page, Task, TaskStats};
use crate::util::dates::format_due;

/// One-line summary: `<short id>  [ ] high    Title  (due 2025-06-01 14:30)`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "{}  {} {:<6}  {}",
        task.short_id(),
        task.status.marker(),
        task.priority.as_str(),
        task.title
    );
    if let Some(due) = &task.due_date {
        line.push_str(&format!("  (due {})", format_due(due)));
    }
    line
}

/// Lines for a page plus a footer with position and totals
pub fn format_page(page: &Page<Task>) -> String {
    if page.items.is_empty() {
        return "No tasks".to_string();
    }
    let mut lines: Vec<String> = page.items.iter().map(format_task_line).collect();
    lines.push(format!(
        "-- page {}/{}, {} task{} --",
        page.page_index() + 1,
        page.page_count(),
        page.total,
        if page.total == 1 { "" } else { "s" }
    ));
    lines.join("\n")
}

/// Today list with a count footer
pub fn format_today(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "Nothing for today".to_string();
    }
    let mut lines: Vec<String> = tasks.iter().map(format_task_line).collect();
    lines.push(format!(
        "-- {} task{} for today --",
        tasks.len(),
        if tasks.len() == 1 { "" } else { "s" }
    ));
    lines.join("\n")
}

pub fn format_stats(stats: &TaskStats) -> String {
    [
        format!("total:       {}", stats.total),
        format!("todo:        {}", stats.by_status.todo),
        format!("doing:       {}", stats.by_status.doing),
        format!("done:        {}", stats.by_status.done),
        format!("today:       {}", stats.today_count),
        format!("completion:  {:.1}%", stats.completion_rate),
    ]
    .join("\n")
}

/// Multi-line detail view
pub fn format_task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("{} {}", task.status.marker(), task.title),
        format!("id:        {}", task.id),
        format!("status:    {}", task.status.as_str()),
        format!("priority:  {}", task.priority.as_str()),
    ];
    if let Some(due) = &task.due_date {
        lines.push(format!("due:       {}", format_due(due)));
    }
    if let Some(done) = &task.completed_at {
        lines.push(format!("completed: {}", format_due(done)));
    }
    lines.push(format!("created:   {}", format_due(&task.created_at)));
    if let Some(description) = &task.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    lines.join("\n")
}
