use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::form::{FormField, TaskForm};
use crate::tui::theme::Theme;
use crate::util::unicode::{fit_to_width, tail_to_width, truncate_to_width};

use super::widgets::{button_span, render_select_list, render_select_trigger};

pub const DIALOG_WIDTH: u16 = 60;
pub const DIALOG_HEIGHT: u16 = 14;
const LABEL_WIDTH: u16 = 13;
const SELECT_WIDTH: u16 = 16;
const DUE_PLACEHOLDER: &str = "YYYY-MM-DD or YYYY-MM-DDTHH:MM";

/// Draw whichever task dialog is open over a dimmed backdrop.
pub fn render_dialog(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(dialog) = app.open_dialog() else {
        return;
    };
    let Some(layout) = dialog.layout(area, DIALOG_WIDTH, DIALOG_HEIGHT) else {
        return;
    };
    let theme = &app.theme;
    let title = if app.create_dialog.is_open() {
        " New task "
    } else {
        " Edit task "
    };

    // Backdrop keeps the page text but mutes it
    frame.render_widget(
        Block::default().style(Style::default().fg(theme.dim).bg(theme.backdrop)),
        layout.backdrop,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme.highlight).bg(theme.background))
        .style(Style::default().fg(theme.text).bg(theme.background));
    let inner = block.inner(layout.content);
    frame.render_widget(Clear, layout.content);
    frame.render_widget(block, layout.content);

    let Some(form) = &app.form else {
        return;
    };
    let fields = render_form(frame, theme, form, inner);
    app.hits.form_fields = fields;
}

fn render_form(
    frame: &mut Frame,
    theme: &Theme,
    form: &TaskForm,
    inner: Rect,
) -> Vec<(Rect, FormField)> {
    let mut hits = Vec::new();
    if inner.width <= LABEL_WIDTH + 2 || inner.height < 4 {
        return hits;
    }
    let x = inner.x + 1;
    let input_x = x + LABEL_WIDTH;
    let input_w = inner.width - LABEL_WIDTH - 2;

    let rows = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Status,
        FormField::Due,
    ];
    for (i, field) in rows.into_iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default()
                .fg(theme.highlight)
                .bg(theme.background)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text).bg(theme.background)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                fit_to_width(field.label(), LABEL_WIDTH as usize),
                label_style,
            )),
            Rect::new(x, y, LABEL_WIDTH, 1),
        );
        hits.push((Rect::new(x, y, LABEL_WIDTH + input_w, 1), field));

        match field {
            FormField::Priority | FormField::Status => {
                let select = if field == FormField::Priority {
                    &form.priority
                } else {
                    &form.status
                };
                let rect = Rect::new(input_x, y, SELECT_WIDTH.min(input_w), 1);
                render_select_trigger(frame, theme, select, rect, focused);
            }
            _ => {
                let text = form.text(field).unwrap_or_default();
                let input = Rect::new(input_x, y, input_w, 1);
                let line = input_line(theme, field, text, focused, input_w);
                frame.render_widget(Paragraph::new(line), input);
            }
        }
    }

    // Validation message
    if let Some(error) = &form.error
        && inner.height > 7
    {
        frame.render_widget(
            Paragraph::new(Span::styled(
                truncate_to_width(error, (inner.width - 2) as usize),
                Style::default().fg(theme.red).bg(theme.background),
            )),
            Rect::new(x, inner.y + inner.height - 3, inner.width - 2, 1),
        );
    }

    // Buttons on the last row, right-aligned
    let y = inner.y + inner.height - 1;
    let (cancel, cancel_w) = button_span(
        theme,
        FormField::Cancel.label(),
        form.focus == FormField::Cancel,
    );
    let (save, save_w) = button_span(theme, FormField::Save.label(), form.focus == FormField::Save);
    let cancel_x = inner.x + inner.width - cancel_w - 1;
    let save_x = cancel_x.saturating_sub(save_w + 2);
    let cancel_rect = Rect::new(cancel_x, y, cancel_w, 1);
    let save_rect = Rect::new(save_x, y, save_w, 1);
    frame.render_widget(Paragraph::new(save), save_rect);
    frame.render_widget(Paragraph::new(cancel), cancel_rect);
    hits.push((save_rect, FormField::Save));
    hits.push((cancel_rect, FormField::Cancel));

    // An open option list floats over the rows below its trigger
    if let Some(select) = form.open_select() {
        render_select_list(frame, theme, select, inner);
    }
    hits
}

fn input_line(
    theme: &Theme,
    field: FormField,
    text: &str,
    focused: bool,
    width: u16,
) -> Line<'static> {
    let width = width as usize;
    if text.is_empty() && !focused {
        let placeholder = match field {
            FormField::Title => "required",
            FormField::Due => DUE_PLACEHOLDER,
            _ => "",
        };
        return Line::from(Span::styled(
            truncate_to_width(placeholder, width),
            Style::default().fg(theme.dim).bg(theme.background),
        ));
    }
    let style = if focused {
        Style::default().fg(theme.text_bright).bg(theme.selection_bg)
    } else {
        Style::default().fg(theme.text).bg(theme.background)
    };
    if focused {
        // Caret at the end; long text scrolls to keep it visible
        let visible = tail_to_width(text, width.saturating_sub(1));
        let text = fit_to_width(&format!("{}\u{258C}", visible), width);
        Line::from(Span::styled(text, style))
    } else {
        Line::from(Span::styled(truncate_to_width(text, width), style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn dialog_rows(output: &str) -> Vec<String> {
        // Content box is centered: rows 5..19, columns 10..70 at 80x24
        output
            .lines()
            .skip(5)
            .take(DIALOG_HEIGHT as usize)
            .map(|l| l.chars().skip(10).take(DIALOG_WIDTH as usize).collect())
            .collect()
    }

    #[test]
    fn closed_dialog_draws_nothing() {
        let mut app = app_with_tasks(&["a"]);
        render_app(&mut app);
        assert_eq!(app.create_dialog.content_area(), None);
        assert!(app.hits.form_fields.is_empty());
    }

    #[test]
    fn create_dialog_layout() {
        let mut app = app_with_tasks(&["a"]);
        app.open_create();
        app.apply_actions();
        let output = render_app(&mut app);
        assert_eq!(app.create_dialog.content_area(), Some(Rect::new(10, 5, 60, 14)));

        let rows = dialog_rows(&output);
        assert!(rows[0].starts_with("\u{250C} New task \u{2500}"));
        assert!(rows[1].starts_with("\u{2502} Title        \u{258C}"));
        assert!(rows[2].starts_with("\u{2502} Description"));
        assert!(rows[3].starts_with("\u{2502} Priority      Medium"));
        assert!(rows[4].starts_with("\u{2502} Status        To do"));
        assert!(rows[5].contains("YYYY-MM-DD or YYYY-MM-DDTHH:MM"));
        assert!(rows[12].ends_with("[ Save ]  [ Cancel ] \u{2502}"));

        // Page content stays visible behind the backdrop
        assert!(output.lines().next().unwrap().contains("WorkLog"));
        assert!(
            app.hits
                .form_fields
                .iter()
                .any(|(_, f)| *f == FormField::Save)
        );
    }

    #[test]
    fn edit_dialog_shows_task_values() {
        let mut app = app_with_tasks(&["Plan sprint"]);
        let id = app.listing.items[0].id;
        app.begin_edit(id);
        let output = render_app(&mut app);
        let rows = dialog_rows(&output);
        assert!(rows[0].starts_with("\u{250C} Edit task "));
        assert!(rows[1].contains("Plan sprint"));
    }

    #[test]
    fn validation_error_is_shown() {
        let mut app = app_with_tasks(&[]);
        app.open_create();
        app.apply_actions();
        app.submit_form();
        let output = render_app(&mut app);
        let rows = dialog_rows(&output);
        assert!(rows[10].contains("Title is required"));
    }

    #[test]
    fn save_button_press_creates_task() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut app = app_in_dir(tmp.path(), &[]);
        app.open_create();
        app.apply_actions();
        app.form.as_mut().unwrap().title = "Clicked".into();
        render_app(&mut app);

        let (save, _) = app
            .hits
            .form_fields
            .iter()
            .find(|(_, f)| *f == FormField::Save)
            .copied()
            .unwrap();
        crate::tui::input::handle_press(&mut app, save.as_position());
        app.apply_actions();
        assert!(app.open_dialog().is_none());
        assert_eq!(app.workspace.tasks[0].title, "Clicked");
    }

    #[test]
    fn open_select_list_stays_inside_dialog() {
        let mut app = app_with_tasks(&[]);
        app.open_create();
        app.apply_actions();
        let form = app.form.as_mut().unwrap();
        form.set_focus(FormField::Status);
        form.status.set_open(true);
        render_app(&mut app);
        let list = app.form.as_ref().unwrap().status.list_area().unwrap();
        let content = app.create_dialog.content_area().unwrap();
        assert!(list.y > content.y && list.y + list.height < content.y + content.height);
    }
}
