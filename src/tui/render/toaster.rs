use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::ui::{Toast, ToastVariant};
use crate::util::unicode::truncate_to_width;

const TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 3;

/// Stack visible toasts in the bottom-right corner, newest lowest, above the
/// pagination row and key hints.
pub fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    let toasts = app.toaster.visible();
    if toasts.is_empty() || area.width < 8 {
        return;
    }
    let reserved = 1 + u16::from(app.workspace.config.ui.show_key_hints);
    let width = TOAST_WIDTH.min(area.width - 2);
    let x = area.x + area.width - width - 1;
    let mut bottom = (area.y + area.height).saturating_sub(reserved);

    for toast in toasts.iter().rev() {
        if bottom < area.y + TOAST_HEIGHT {
            break;
        }
        let rect = Rect::new(x, bottom - TOAST_HEIGHT, width, TOAST_HEIGHT);
        render_toast(frame, &app.theme, toast, rect);
        bottom -= TOAST_HEIGHT;
    }
}

pub fn render_toast(frame: &mut Frame, theme: &Theme, toast: &Toast, rect: Rect) {
    let accent = match toast.options.variant {
        ToastVariant::Default => theme.highlight,
        ToastVariant::Destructive => theme.red,
    };
    let inner_w = rect.width.saturating_sub(2) as usize;
    let title = toast.options.title.as_deref().unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            truncate_to_width(title, inner_w),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(accent).bg(theme.background))
        .style(Style::default().fg(theme.text).bg(theme.background));
    let body = toast.options.description.as_deref().unwrap_or_default();

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(truncate_to_width(body, inner_w)).block(block),
        rect,
    );
}
