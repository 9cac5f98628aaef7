use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::ui::{OverlayHit, PointerEvent, Select};
use crate::util::unicode::pop_grapheme;

use super::app::{App, Focus};
use super::form::FormField;

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// Handle a key press. Dialogs and open option lists take input first.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.open_dialog().is_some() {
        handle_dialog_key(app, key);
        return;
    }
    if app.priority_filter.is_open() {
        let select = app.priority_filter.clone();
        handle_open_select(&select, key);
        return;
    }
    match app.focus {
        Focus::List => handle_navigate(app, key),
        Focus::Search => handle_search(app, key),
    }
}

/// Keys for an option list that is showing. Returns whether the key was used.
fn handle_open_select(select: &Select, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => select.highlight_prev(),
        KeyCode::Down | KeyCode::Char('j') => select.highlight_next(),
        KeyCode::Enter | KeyCode::Char(' ') => select.activate_highlighted(),
        KeyCode::Esc => select.set_open(false),
        _ => return false,
    }
    true
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.focus = Focus::Search,
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Home | KeyCode::Char('g') => app.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => app.move_cursor(isize::MAX / 2),
        KeyCode::Left | KeyCode::Char('h') => app.status_tabs.cycle(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.status_tabs.cycle(1),
        KeyCode::BackTab => app.status_tabs.cycle(-1),
        KeyCode::Char('p') => app.priority_filter.toggle_open(),
        KeyCode::Char(']') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('[') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('r') => app.reset_filters(),
        KeyCode::Char('n') => app.open_create(),
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(id) = app.selected_task().map(|t| t.id) {
                app.begin_edit(id);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('x') => app.cycle_selected_status(),
        KeyCode::Char('D') | KeyCode::Delete => app.delete_selected(),
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Down | KeyCode::Tab => app.focus = Focus::List,
        KeyCode::Backspace => {
            let mut text = app.search_input.clone();
            pop_grapheme(&mut text);
            app.set_search(text);
        }
        KeyCode::Char(c) => {
            let mut text = app.search_input.clone();
            text.push(c);
            app.set_search(text);
        }
        _ => {}
    }
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    let Some(form) = &mut app.form else {
        // A dialog without a form has nothing to edit
        if key.code == KeyCode::Esc {
            app.close_dialog();
        }
        return;
    };

    if let Some(select) = form.open_select().cloned()
        && handle_open_select(&select, key)
    {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Char('s') if ctrl => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Enter => match form.focus {
            FormField::Save => app.submit_form(),
            FormField::Cancel => app.close_dialog(),
            FormField::Priority | FormField::Status => {
                if let Some(select) = form.focused_select() {
                    select.toggle_open();
                }
            }
            _ => form.focus_next(),
        },
        KeyCode::Char(' ') if form.focused_select().is_some() => {
            if let Some(select) = form.focused_select() {
                select.toggle_open();
            }
        }
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !ctrl => {
            form.insert_char(c);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let position = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_press(app, position),
        MouseEventKind::ScrollDown if app.open_dialog().is_none() => app.move_cursor(1),
        MouseEventKind::ScrollUp if app.open_dialog().is_none() => app.move_cursor(-1),
        _ => {}
    }
}

/// Route a press to the component under it, then to every document listener.
pub fn handle_press(app: &mut App, position: Position) {
    press_components(app, position);
    app.listeners
        .dispatch(&PointerEvent::at(position.x, position.y));
}

fn press_components(app: &mut App, position: Position) {
    if let Some(dialog) = app.open_dialog() {
        if dialog.handle_press(position) == OverlayHit::Content {
            press_form(app, position);
        }
        return;
    }

    if app.priority_filter.handle_press(position) || app.status_tabs.handle_press(position) {
        return;
    }
    let hits = app.hits.clone();
    if hit(hits.new_task, position) {
        app.open_create();
    } else if hit(hits.reset_filters, position) {
        app.reset_filters();
    } else if hit(hits.prev_page, position) {
        app.prev_page();
    } else if hit(hits.next_page, position) {
        app.next_page();
    } else if hit(hits.search, position) {
        app.focus = Focus::Search;
    } else if let Some(id) = hits
        .rows
        .iter()
        .find(|(area, _)| area.contains(position))
        .map(|(_, id)| *id)
    {
        app.focus = Focus::List;
        // A press on the selected row opens it
        if app.selected_task().is_some_and(|t| t.id == id) {
            app.begin_edit(id);
        } else if let Some(row) = app.listing.items.iter().position(|t| t.id == id) {
            app.cursor = row;
        }
    } else {
        app.focus = Focus::List;
    }
}

fn press_form(app: &mut App, position: Position) {
    let Some(form) = &mut app.form else {
        return;
    };
    if form.priority.handle_press(position) {
        form.focus = FormField::Priority;
        return;
    }
    if form.status.handle_press(position) {
        form.focus = FormField::Status;
        return;
    }
    let field = app
        .hits
        .form_fields
        .iter()
        .find(|(area, _)| area.contains(position))
        .map(|(_, field)| *field);
    match field {
        Some(FormField::Save) => app.submit_form(),
        Some(FormField::Cancel) => app.close_dialog(),
        Some(field) => form.focus = field,
        None => {}
    }
}

fn hit(area: Option<Rect>, position: Position) -> bool {
    area.is_some_and(|a| a.contains(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::ALL;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press(app: &mut App, x: u16, y: u16) {
        handle_press(app, Position::new(x, y));
        app.apply_actions();
    }

    fn center(area: Rect) -> (u16, u16) {
        (area.x + area.width / 2, area.y + area.height / 2)
    }

    #[test]
    fn search_typing_filters_live() {
        let mut app = app_with_tasks(&["alpha", "beta"]);
        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.focus, Focus::Search);
        handle_key(&mut app, key(KeyCode::Char('B')));
        assert_eq!(app.listing.total, 1);
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.listing.total, 2);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.focus, Focus::List);
    }

    #[test]
    fn arrow_keys_cycle_status_tabs() {
        let mut app = app_with_tasks(&["a"]);
        handle_key(&mut app, key(KeyCode::Right));
        app.apply_actions();
        assert_eq!(app.status_tabs.value(), "todo");
        handle_key(&mut app, key(KeyCode::Left));
        app.apply_actions();
        assert_eq!(app.status_tabs.value(), ALL);
        // Wraps from the first tab to the last
        handle_key(&mut app, key(KeyCode::Left));
        app.apply_actions();
        assert_eq!(app.status_tabs.value(), "done");
    }

    #[test]
    fn priority_filter_from_keyboard() {
        let mut app = app_with_tasks(&["a"]);
        handle_key(&mut app, key(KeyCode::Char('p')));
        assert!(app.priority_filter.is_open());
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Enter));
        app.apply_actions();
        assert!(!app.priority_filter.is_open());
        assert_eq!(app.priority_filter.value(), "high");
        assert_eq!(app.listeners.len(), 0);
    }

    #[test]
    fn escape_closes_open_list_before_dialog() {
        let mut app = app_with_tasks(&[]);
        handle_key(&mut app, key(KeyCode::Char('n')));
        app.apply_actions();
        let form = app.form.as_mut().unwrap();
        form.set_focus(FormField::Priority);
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.form.as_ref().unwrap().priority.is_open());

        handle_key(&mut app, key(KeyCode::Esc));
        app.apply_actions();
        assert!(app.create_dialog.is_open());
        assert!(!app.form.as_ref().unwrap().priority.is_open());

        handle_key(&mut app, key(KeyCode::Esc));
        app.apply_actions();
        assert!(app.open_dialog().is_none());
    }

    #[test]
    fn typing_fills_form_and_ctrl_s_saves() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut app = app_in_dir(tmp.path(), &[]);
        handle_key(&mut app, key(KeyCode::Char('n')));
        app.apply_actions();
        for c in "Plan".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        let mut save = key(KeyCode::Char('s'));
        save.modifiers = KeyModifiers::CONTROL;
        handle_key(&mut app, save);
        app.apply_actions();
        assert!(app.open_dialog().is_none());
        assert_eq!(app.workspace.tasks[0].title, "Plan");
    }

    #[test]
    fn mouse_new_task_then_backdrop_closes() {
        let mut app = app_with_tasks(&["a"]);
        render_app(&mut app);
        let (x, y) = center(app.hits.new_task.unwrap());
        press(&mut app, x, y);
        assert!(app.create_dialog.is_open());

        render_app(&mut app);
        let content = app.create_dialog.content_area().unwrap();
        // The top border belongs to the content but to no field
        press(&mut app, content.x + 1, content.y);
        assert!(app.create_dialog.is_open(), "content presses never close");

        press(&mut app, 0, 0);
        assert!(!app.create_dialog.is_open());
        assert!(app.form.is_none());
    }

    #[test]
    fn mouse_priority_filter_pick_and_outside_dismiss() {
        let mut app = app_with_tasks(&["a"]);
        app.workspace.tasks[0].priority = crate::model::task::TaskPriority::Low;
        app.refresh();
        render_app(&mut app);

        let (x, y) = center(app.priority_filter.trigger_area().unwrap());
        press(&mut app, x, y);
        assert!(app.priority_filter.is_open());
        assert_eq!(app.listeners.len(), 1);

        // Far outside: the document listener closes the list, value unchanged
        press(&mut app, 0, TERM_H - 1);
        assert!(!app.priority_filter.is_open());
        assert_eq!(app.listeners.len(), 0);
        assert_eq!(app.priority_filter.value(), ALL);

        press(&mut app, x, y);
        render_app(&mut app);
        let list = app.priority_filter.list_area().unwrap();
        // Rows: all, high, medium, low
        press(&mut app, list.x + 2, list.y + 4);
        assert!(!app.priority_filter.is_open());
        assert_eq!(app.priority_filter.value(), "low");
        assert_eq!(app.listing.total, 1);
    }

    #[test]
    fn mouse_row_selects_then_opens() {
        let mut app = app_with_tasks(&["a", "b"]);
        render_app(&mut app);
        let (area, _) = app.hits.rows[1];
        press(&mut app, area.x + 1, area.y);
        assert_eq!(app.cursor, 1);
        assert!(app.editing.is_none());
        press(&mut app, area.x + 1, area.y);
        assert_eq!(app.editing, Some(app.listing.items[1].id));
        assert!(app.edit_dialog.is_open());
    }

    #[test]
    fn mouse_status_tab() {
        let mut app = app_with_tasks(&["a"]);
        render_app(&mut app);
        let done = app.status_tabs.area_of("done").expect("done tab drawn");
        press(&mut app, done.x, done.y);
        assert_eq!(app.status_tabs.value(), "done");
        assert_eq!(app.listing.total, 0);
    }
}
