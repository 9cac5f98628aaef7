use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::{Task, TaskStatus};
use crate::tui::app::{App, Focus};
use crate::util::dates::format_due;
use crate::util::unicode::{display_width, fit_to_width, truncate_to_width};

use super::widgets::{button_span, render_select_trigger};

const SEARCH_WIDTH: u16 = 30;
const PRIORITY_WIDTH: u16 = 20;
const RESET_LABEL: &str = "\u{2715} reset filters";

/// Title, task count and the "new task" trigger, with a separator below
pub fn render_header(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let all = app.workspace.tasks.len();
    let count = if app.filter.is_active() {
        format!("{} of {} tasks", app.listing.total, all)
    } else {
        format!("{} task{}", all, if all == 1 { "" } else { "s" })
    };
    let line = Line::from(vec![
        Span::styled(
            " WorkLog",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", Style::default().bg(bg)),
        Span::styled(count, Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(
            format!(
                "  \u{00B7}  {} today  {:.1}% done",
                app.stats.today_count, app.stats.completion_rate
            ),
            Style::default().fg(app.theme.text).bg(bg),
        ),
    ]);
    let row = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(Paragraph::new(line), row);

    let (button, width) = button_span(&app.theme, &app.new_task_button.label, false);
    if width + 1 < area.width {
        let rect = Rect::new(area.x + area.width - width - 1, area.y, width, 1);
        frame.render_widget(Paragraph::new(button), rect);
        app.hits.new_task = Some(rect);
    }

    if area.height > 1 {
        let sep = "\u{2500}".repeat(area.width as usize);
        frame.render_widget(
            Paragraph::new(sep).style(Style::default().fg(app.theme.dim).bg(bg)),
            Rect::new(area.x, area.y + 1, area.width, 1),
        );
    }
}

/// Search box, priority select and (when filtering) the reset control
pub fn render_filter_bar(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let mut x = area.x + 1;
    let right = area.x + area.width;

    // Search box
    let search_w = SEARCH_WIDTH.min(area.width / 2);
    let focused = app.focus == Focus::Search;
    let (text, style) = if app.search_input.is_empty() && !focused {
        (
            "/ Search tasks...".to_string(),
            Style::default().fg(app.theme.dim).bg(bg),
        )
    } else {
        let cursor = if focused { "\u{258C}" } else { "" };
        (
            format!("/ {}{}", app.search_input, cursor),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )
    };
    let search = Rect::new(x, area.y, search_w, 1);
    frame.render_widget(
        Paragraph::new(Span::styled(
            truncate_to_width(&text, search_w as usize),
            style,
        )),
        search,
    );
    app.hits.search = Some(search);
    x += search_w + 2;

    // Priority filter
    if x + PRIORITY_WIDTH <= right {
        let rect = Rect::new(x, area.y, PRIORITY_WIDTH, 1);
        render_select_trigger(frame, &app.theme, &app.priority_filter, rect, false);
        x += PRIORITY_WIDTH + 2;
    }

    // Reset
    let reset_w = display_width(RESET_LABEL) as u16;
    if app.filter.is_active() && x + reset_w <= right {
        let rect = Rect::new(x, area.y, reset_w, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                RESET_LABEL,
                Style::default().fg(app.theme.highlight).bg(bg),
            )),
            rect,
        );
        app.hits.reset_filters = Some(rect);
    }
}

/// Status tabs with a separator line below, joined at each divider
pub fn render_status_tabs(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    let mut areas = Vec::new();
    let mut sep_cols = Vec::new();
    let mut col: u16 = 1;

    let triggers = app.status_tabs.triggers();
    for (i, trigger) in triggers.iter().enumerate() {
        if i > 0 {
            sep_cols.push(col as usize);
            spans.push(Span::styled(
                "\u{2502}",
                Style::default().fg(app.theme.dim).bg(bg),
            ));
            col += 1;
        }
        let label = format!(" {} ", trigger.label);
        let width = display_width(&label) as u16;
        let style = if trigger.is_active {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        if col + width <= area.width {
            areas.push((
                Rect::new(area.x + col, area.y, width, 1),
                trigger.value.clone(),
            ));
        }
        spans.push(Span::styled(label, style));
        col += width;
    }
    app.status_tabs.set_areas(areas);
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    if area.height > 1 {
        let sep: String = (0..area.width as usize)
            .map(|c| {
                if sep_cols.contains(&c) {
                    '\u{2534}'
                } else {
                    '\u{2500}'
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(sep).style(Style::default().fg(app.theme.dim).bg(bg)),
            Rect::new(area.x, area.y + 1, area.width, 1),
        );
    }
}

/// The current page of tasks, scrolled so the cursor stays visible
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    if app.listing.items.is_empty() {
        let msg = if app.filter.is_active() {
            "No tasks match the current filters"
        } else {
            "No tasks yet. Press n to add one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  {}", msg),
                Style::default().fg(app.theme.dim).bg(bg),
            )),
            Rect::new(area.x, area.y, area.width, 1),
        );
        return;
    }

    let height = area.height as usize;
    let offset = app.cursor.saturating_sub(height.saturating_sub(1));
    let now = Utc::now();
    for (i, task) in app.listing.items.iter().enumerate().skip(offset).take(height) {
        let row = Rect::new(area.x, area.y + (i - offset) as u16, area.width, 1);
        let line = task_line(app, task, i == app.cursor, area.width as usize, now);
        frame.render_widget(Paragraph::new(line), row);
        app.hits.rows.push((row, task.id));
    }
}

fn task_line(
    app: &App,
    task: &Task,
    selected: bool,
    width: usize,
    now: chrono::DateTime<Utc>,
) -> Line<'static> {
    let theme = &app.theme;
    let bg = if selected {
        theme.selection_bg
    } else {
        theme.background
    };
    let done = task.status == TaskStatus::Done;

    let due = task.due_date.map(|d| {
        let overdue = !done && d < now;
        let color = if overdue { theme.red } else { theme.dim };
        (format!("due {}", format_due(&d)), color)
    });
    // " [ ] Medium " prefix, due date flush right
    let prefix_w = 12;
    let due_w = due.as_ref().map_or(0, |(s, _)| display_width(s) + 1);
    let title_w = width.saturating_sub(prefix_w + due_w);

    let mut title_style = Style::default()
        .fg(if selected { theme.text_bright } else { theme.text })
        .bg(bg);
    if done {
        title_style = title_style
            .fg(theme.dim)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            task.status.marker(),
            Style::default().fg(theme.status_color(task.status)).bg(bg),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            fit_to_width(task.priority.label(), 6),
            Style::default()
                .fg(theme.priority_color(task.priority))
                .bg(bg),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(fit_to_width(&task.title, title_w), title_style),
    ];
    if let Some((text, color)) = due {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.push(Span::styled(text, Style::default().fg(color).bg(bg)));
    }
    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(bg),
        ));
    }
    Line::from(spans)
}

/// `‹ Prev   1 / 3   Next ›`
pub fn render_pagination(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let enabled = Style::default().fg(app.theme.highlight).bg(bg);
    let disabled = Style::default().fg(app.theme.dim).bg(bg);

    let has_prev = app.page > 0;
    let has_next = app.listing.has_more;
    let middle = format!(
        "{} / {}",
        app.listing.page_index() + 1,
        app.listing.page_count()
    );
    let middle_w = display_width(&middle) as u16;

    let line = Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{2039} Prev", if has_prev { enabled } else { disabled }),
        Span::styled("   ", Style::default().bg(bg)),
        Span::styled(middle, Style::default().fg(app.theme.text).bg(bg)),
        Span::styled("   ", Style::default().bg(bg)),
        Span::styled("Next \u{203A}", if has_next { enabled } else { disabled }),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if has_prev {
        app.hits.prev_page = Some(Rect::new(area.x + 1, area.y, 6, 1));
    }
    let next_x = area.x + 1 + 6 + 3 + middle_w + 3;
    if has_next && next_x + 6 <= area.x + area.width {
        app.hits.next_page = Some(Rect::new(next_x, area.y, 6, 1));
    }
}

/// One line of key hints for the current context
pub fn render_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.open_dialog().is_some() {
        "tab next field  enter open/choose  ctrl-s save  esc close"
    } else if app.priority_filter.is_open() {
        "\u{2191}\u{2193} move  enter choose  esc close"
    } else if app.focus == Focus::Search {
        "type to search  enter/esc done"
    } else {
        "n new  enter edit  space status  D del  / search  p priority  [ ] page  q quit"
    };
    let text = truncate_to_width(&format!(" {}", hints), area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        )),
        area,
    );
}
