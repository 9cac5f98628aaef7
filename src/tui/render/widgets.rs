use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::theme::Theme;
use crate::ui::Select;
use crate::util::unicode::{display_width, fit_to_width};

/// Draw a select's trigger (`label ▾`) and record its area.
pub fn render_select_trigger(
    frame: &mut Frame,
    theme: &Theme,
    select: &Select,
    area: Rect,
    focused: bool,
) {
    let label_width = (area.width as usize).saturating_sub(3);
    let text = format!(" {} \u{25BE}", fit_to_width(&select.trigger_label(), label_width));
    let style = if focused || select.is_open() {
        Style::default()
            .fg(theme.text_bright)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).bg(theme.background)
    };
    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
    select.set_trigger_area(area);
}

/// Draw an open select's option list under (or above) its trigger, kept
/// inside `bounds`, and record the list area for pointer routing.
pub fn render_select_list(frame: &mut Frame, theme: &Theme, select: &Select, bounds: Rect) {
    let Some(trigger) = select.trigger_area() else {
        return;
    };
    let items = select.items();
    let widest = items
        .iter()
        .map(|item| display_width(&item.label))
        .max()
        .unwrap_or(0);
    let width = (trigger.width.max(widest as u16 + 4)).min(bounds.width);
    let height = select.list_height().min(bounds.height);

    let below = trigger.y + 1;
    let y = if below + height <= bounds.y + bounds.height {
        below
    } else {
        trigger.y.saturating_sub(height).max(bounds.y)
    };
    let x = trigger.x.min((bounds.x + bounds.width).saturating_sub(width));
    let area = Rect::new(x, y, width, height);

    let bg = theme.background;
    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            let marker = if item.is_selected { "\u{2713} " } else { "  " };
            let text = fit_to_width(&format!("{}{}", marker, item.label), (width as usize).saturating_sub(2));
            let style = if item.is_highlighted {
                Style::default()
                    .fg(theme.text_bright)
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else if item.is_selected {
                Style::default().fg(theme.highlight).bg(bg)
            } else {
                Style::default().fg(theme.text).bg(bg)
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
    select.set_list_area(area);
}

/// `[ label ]` styled as a button, with its width in cells
pub fn button_span(theme: &Theme, label: &str, focused: bool) -> (Span<'static>, u16) {
    let text = format!("[ {} ]", label);
    let width = display_width(&text) as u16;
    let style = if focused {
        Style::default()
            .fg(theme.background)
            .bg(theme.highlight)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.highlight).bg(theme.background)
    };
    (Span::styled(text, style), width)
}
