//! Overlay controller behind modal dialogs.
//!
//! An [`Overlay`] owns the open/closed state of a dialog, or mirrors it when an
//! owner controls it. The trigger, backdrop and content parts all read the
//! same handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ratatui::layout::{Position, Rect};

use super::{ClickFn, OpenChangeFn};

/// Who owns the open state. Fixed when the overlay is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    /// The owner supplies `open` on every update; the overlay only reports.
    Controlled,
    /// The overlay stores `open` itself and still reports every transition.
    Uncontrolled,
}

/// Construction input for an [`Overlay`].
#[derive(Clone, Default)]
pub struct OverlayProps {
    /// `Some` selects controlled mode with this initial value.
    pub open: Option<bool>,
    pub on_open_change: Option<OpenChangeFn>,
}

impl OverlayProps {
    pub fn controlled(open: bool) -> Self {
        OverlayProps {
            open: Some(open),
            on_open_change: None,
        }
    }

    pub fn uncontrolled() -> Self {
        Self::default()
    }

    pub fn on_open_change(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_open_change = Some(Rc::new(f));
        self
    }
}

/// Where a pointer press landed relative to an open overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayHit {
    /// The overlay is closed; nothing of it is on screen.
    Closed,
    /// Inside the content region.
    Content,
    /// On the full-area backdrop beneath the content.
    Backdrop,
}

/// Geometry of an open overlay for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub backdrop: Rect,
    pub content: Rect,
}

struct OverlayState {
    mode: OverlayMode,
    open: bool,
    on_open_change: Option<OpenChangeFn>,
    content_area: Option<Rect>,
}

/// Handle to an overlay's shared state. Clones refer to the same overlay.
#[derive(Clone)]
pub struct Overlay {
    state: Rc<RefCell<OverlayState>>,
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Overlay")
            .field("mode", &state.mode)
            .field("open", &state.open)
            .field("content_area", &state.content_area)
            .finish()
    }
}

impl Overlay {
    pub fn new(props: OverlayProps) -> Self {
        let (mode, open) = match props.open {
            Some(open) => (OverlayMode::Controlled, open),
            None => (OverlayMode::Uncontrolled, false),
        };
        Overlay {
            state: Rc::new(RefCell::new(OverlayState {
                mode,
                open,
                on_open_change: props.on_open_change,
                content_area: None,
            })),
        }
    }

    pub fn mode(&self) -> OverlayMode {
        self.state.borrow().mode
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    /// Owner update for a controlled overlay. Uncontrolled overlays ignore it.
    pub fn set_open_prop(&self, open: bool) {
        let mut state = self.state.borrow_mut();
        match state.mode {
            OverlayMode::Controlled => {
                state.open = open;
                if !open {
                    state.content_area = None;
                }
            }
            OverlayMode::Uncontrolled => {
                tracing::debug!("open value supplied to an uncontrolled overlay; ignored");
            }
        }
    }

    pub fn open(&self) {
        self.request(true);
    }

    pub fn close(&self) {
        self.request(false);
    }

    pub fn toggle(&self) {
        let next = !self.is_open();
        self.request(next);
    }

    /// Apply `next` (uncontrolled only), then notify. Notification happens even
    /// when `next` equals the current state.
    fn request(&self, next: bool) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.mode == OverlayMode::Uncontrolled {
                state.open = next;
                if !next {
                    state.content_area = None;
                }
            }
            state.on_open_change.clone()
        };
        tracing::debug!(open = next, "overlay open change requested");
        if let Some(callback) = callback {
            callback(next);
        }
    }

    /// Lay out the overlay inside `viewport` with a centered content box of at
    /// most `width` x `height`. Returns `None` when closed: nothing is drawn.
    pub fn layout(&self, viewport: Rect, width: u16, height: u16) -> Option<OverlayLayout> {
        let mut state = self.state.borrow_mut();
        if !state.open {
            state.content_area = None;
            return None;
        }
        let w = width.min(viewport.width);
        let h = height.min(viewport.height);
        let x = viewport.x + (viewport.width - w) / 2;
        let y = viewport.y + (viewport.height - h) / 2;
        let content = Rect::new(x, y, w, h);
        state.content_area = Some(content);
        Some(OverlayLayout {
            backdrop: viewport,
            content,
        })
    }

    /// The content region from the last layout, if open.
    pub fn content_area(&self) -> Option<Rect> {
        self.state.borrow().content_area
    }

    pub fn hit_test(&self, position: Position) -> OverlayHit {
        let state = self.state.borrow();
        if !state.open {
            return OverlayHit::Closed;
        }
        match state.content_area {
            Some(area) if area.contains(position) => OverlayHit::Content,
            _ => OverlayHit::Backdrop,
        }
    }

    /// Route a pointer press. A press on the backdrop closes the overlay;
    /// presses inside the content never do. Returns the hit for further routing.
    pub fn handle_press(&self, position: Position) -> OverlayHit {
        let hit = self.hit_test(position);
        if hit == OverlayHit::Backdrop {
            self.close();
        }
        hit
    }
}

/// A clickable element with an optional handler.
#[derive(Clone, Default)]
pub struct Button {
    pub label: String,
    on_click: Option<ClickFn>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Button {
            label: label.into(),
            on_click: None,
        }
    }

    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }

    pub fn click(&self) {
        if let Some(handler) = &self.on_click {
            handler();
        }
    }
}

/// Builds buttons that open an overlay.
pub struct Trigger;

impl Trigger {
    /// A standalone trigger button.
    pub fn button(overlay: &Overlay, label: impl Into<String>) -> Button {
        Self::wrap(overlay, Button::new(label))
    }

    /// Wrap an existing button. Its own handler is kept and runs after the
    /// overlay has been asked to open.
    pub fn wrap(overlay: &Overlay, child: Button) -> Button {
        let overlay = overlay.clone();
        let original = child.on_click;
        Button {
            label: child.label,
            on_click: Some(Rc::new(move || {
                overlay.open();
                if let Some(original) = &original {
                    original();
                }
            })),
        }
    }
}
