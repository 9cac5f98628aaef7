use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use uuid::Uuid;

use crate::model::{Config, Task, TaskPriority, TaskStatus, Workspace};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A todo/medium task with a stable id, ordered by `i`.
pub fn task(i: usize, title: &str) -> Task {
    Task {
        id: Uuid::from_u128(i as u128 + 1),
        title: title.to_string(),
        description: None,
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_date: None,
        completed_at: None,
        order: i as i64,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        updated_at: None,
    }
}

/// A workspace rooted at `root` holding one task per title.
pub fn workspace_with_tasks(root: &Path, titles: &[&str]) -> Workspace {
    Workspace {
        root: root.to_path_buf(),
        data_dir: root.join("worklog"),
        config: Config::default(),
        tasks: titles
            .iter()
            .enumerate()
            .map(|(i, t)| task(i, t))
            .collect(),
    }
}

/// An app over in-memory tasks. Nothing is written unless a test saves.
pub fn app_with_tasks(titles: &[&str]) -> App {
    App::new(workspace_with_tasks(
        &PathBuf::from("/tmp/worklog-test"),
        titles,
    ))
}

/// An app whose workspace directory exists on disk, for tests that persist.
pub fn app_in_dir(dir: &Path, titles: &[&str]) -> App {
    let workspace = workspace_with_tasks(dir, titles);
    std::fs::create_dir_all(&workspace.data_dir).unwrap();
    App::new(workspace)
}

/// Draw the whole app at the standard test size.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| {
        super::render(frame, app);
    })
}
