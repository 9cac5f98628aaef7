//! Document-level pointer listeners and outside-click dismissal.
//!
//! A [`PointerListeners`] registry plays the role of the document: every
//! mouse-down is dispatched to all registered listeners after component-level
//! hit testing. Registration hands back a [`ListenerGuard`]; dropping the guard
//! removes the listener, so a listener can never outlive the state that
//! installed it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ratatui::layout::{Position, Rect};

/// A pointer press at a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub position: Position,
}

impl PointerEvent {
    pub fn at(column: u16, row: u16) -> Self {
        PointerEvent {
            position: Position::new(column, row),
        }
    }

    /// True when the event lands outside every one of `areas`.
    /// Unknown (not yet rendered) areas never contain the event.
    pub fn is_outside(&self, areas: &[Option<Rect>]) -> bool {
        !areas
            .iter()
            .flatten()
            .any(|area| area.contains(self.position))
    }
}

type Listener = Rc<dyn Fn(&PointerEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }
}

/// Shared registry of pointer listeners. Cloning yields another handle to the
/// same registry.
#[derive(Clone, Default)]
pub struct PointerListeners {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for PointerListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListeners")
            .field("len", &self.len())
            .finish()
    }
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` until the returned guard is dropped.
    #[must_use = "dropping the guard immediately removes the listener"]
    pub fn listen(&self, listener: impl Fn(&PointerEvent) + 'static) -> ListenerGuard {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::new(listener)));
        tracing::trace!(listener = id, total = registry.listeners.len(), "pointer listener added");
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call.
    ///
    /// Listeners may register or release listeners while running. A listener
    /// released by an earlier listener in the same dispatch is skipped.
    pub fn dispatch(&self, event: &PointerEvent) {
        let snapshot: Vec<(u64, Listener)> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();

        for (id, listener) in snapshot {
            if self.registry.borrow().is_registered(id) {
                listener(event);
            }
        }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped registration in a [`PointerListeners`] registry.
pub struct ListenerGuard {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            registry.listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(
                listener = self.id,
                total = registry.listeners.len(),
                "pointer listener released"
            );
        }
    }
}

/// Listen for presses that land outside every area returned by `areas`,
/// calling `on_outside` for each one.
#[must_use = "dropping the guard immediately removes the listener"]
pub fn on_outside_press<A, F>(listeners: &PointerListeners, areas: A, on_outside: F) -> ListenerGuard
where
    A: Fn() -> Vec<Option<Rect>> + 'static,
    F: Fn() + 'static,
{
    listeners.listen(move |event| {
        if event.is_outside(&areas()) {
            on_outside();
        }
    })
}
