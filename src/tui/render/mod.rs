pub mod dialog;
pub mod tasks_page;
pub mod toaster;
pub mod widgets;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, HitMap};

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let hint_rows = u16::from(app.workspace.config.ui.show_key_hints);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),         // header + separator
            Constraint::Length(1),         // search / priority / reset
            Constraint::Length(2),         // status tabs + separator
            Constraint::Min(1),            // task list
            Constraint::Length(1),         // pagination
            Constraint::Length(hint_rows), // key hints
        ])
        .split(area);

    // Hit regions are rebuilt every frame
    app.hits = HitMap::default();

    tasks_page::render_header(frame, app, chunks[0]);
    tasks_page::render_filter_bar(frame, app, chunks[1]);
    tasks_page::render_status_tabs(frame, app, chunks[2]);
    tasks_page::render_task_list(frame, app, chunks[3]);
    tasks_page::render_pagination(frame, app, chunks[4]);
    if hint_rows > 0 {
        tasks_page::render_key_hints(frame, app, chunks[5]);
    }

    // Option list floats over the page
    if app.priority_filter.is_open() {
        widgets::render_select_list(frame, &app.theme, &app.priority_filter, area);
    }

    dialog::render_dialog(frame, app, area);
    toaster::render_toasts(frame, app, area);
}
