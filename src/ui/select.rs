//! Selection controller behind dropdown pickers.
//!
//! The current value belongs to the owner: [`Select::select`] reports the
//! chosen value through the change callback and closes the list, and the owner
//! pushes the new value back with [`Select::set_value`]. The list open state
//! belongs to the select itself.
//!
//! While the list is open the select holds one outside-press listener in the
//! shared [`PointerListeners`] registry. The listener is released when the list
//! closes and when the last handle is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use ratatui::layout::{Position, Rect};

use super::ValueChangeFn;
use super::dismiss::{ListenerGuard, PointerListeners, on_outside_press};

const DEFAULT_PLACEHOLDER: &str = "Select...";

struct SelectState {
    value: String,
    /// value -> label, in display order
    options: IndexMap<String, String>,
    placeholder: String,
    open: bool,
    highlighted: usize,
    on_value_change: Option<ValueChangeFn>,
    trigger_area: Option<Rect>,
    list_area: Option<Rect>,
    listeners: PointerListeners,
    dismiss: Option<ListenerGuard>,
}

/// Handle to a select's shared state. Clones refer to the same select.
#[derive(Clone)]
pub struct Select {
    state: Rc<RefCell<SelectState>>,
}

/// Render-time view of one option. Not stored; rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
    pub is_selected: bool,
    pub is_highlighted: bool,
}

impl OptionItem {
    /// Choose this option in `select`.
    pub fn activate(&self, select: &Select) {
        select.select(&self.value);
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Select")
            .field("value", &state.value)
            .field("open", &state.open)
            .field("options", &state.options.len())
            .finish()
    }
}

impl Select {
    /// A closed select showing `value`, dismissed by presses routed through
    /// `listeners`.
    pub fn new(listeners: &PointerListeners, value: impl Into<String>) -> Self {
        Select {
            state: Rc::new(RefCell::new(SelectState {
                value: value.into(),
                options: IndexMap::new(),
                placeholder: DEFAULT_PLACEHOLDER.to_string(),
                open: false,
                highlighted: 0,
                on_value_change: None,
                trigger_area: None,
                list_area: None,
                listeners: listeners.clone(),
                dismiss: None,
            })),
        }
    }

    pub fn option(self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .options
            .insert(value.into(), label.into());
        self
    }

    pub fn placeholder(self, placeholder: impl Into<String>) -> Self {
        self.state.borrow_mut().placeholder = placeholder.into();
        self
    }

    pub fn on_value_change(self, f: impl Fn(&str) + 'static) -> Self {
        self.state.borrow_mut().on_value_change = Some(Rc::new(f));
        self
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Owner update after a value change was reported (or at any other time).
    pub fn set_value(&self, value: impl Into<String>) {
        self.state.borrow_mut().value = value.into();
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    /// Show or hide the option list. Never touches the value.
    pub fn set_open(&self, open: bool) {
        let released = {
            let mut state = self.state.borrow_mut();
            if state.open == open {
                return;
            }
            state.open = open;
            if open {
                state.highlighted = state.options.get_index_of(&state.value).unwrap_or(0);
                state.dismiss = Some(self.listen_outside(&state.listeners));
                None
            } else {
                state.list_area = None;
                state.dismiss.take()
            }
        };
        tracing::debug!(open, "select list toggled");
        drop(released);
    }

    pub fn toggle_open(&self) {
        let open = self.is_open();
        self.set_open(!open);
    }

    fn listen_outside(&self, listeners: &PointerListeners) -> ListenerGuard {
        let areas_of: Weak<RefCell<SelectState>> = Rc::downgrade(&self.state);
        let close_target = Weak::clone(&areas_of);
        on_outside_press(
            listeners,
            move || match areas_of.upgrade() {
                Some(state) => {
                    let state = state.borrow();
                    vec![state.trigger_area, state.list_area]
                }
                None => Vec::new(),
            },
            move || {
                if let Some(state) = close_target.upgrade() {
                    Select { state }.set_open(false);
                }
            },
        )
    }

    /// Report `value` to the owner, then close the list, as one transition.
    pub fn select(&self, value: &str) {
        let callback = self.state.borrow().on_value_change.clone();
        tracing::debug!(value, "select value chosen");
        if let Some(callback) = callback {
            callback(value);
        }
        self.set_open(false);
    }

    /// Label for the trigger: the option label for the current value, the raw
    /// value when no option maps it, or the placeholder when empty.
    pub fn trigger_label(&self) -> String {
        let state = self.state.borrow();
        if state.value.is_empty() {
            return state.placeholder.clone();
        }
        state
            .options
            .get(&state.value)
            .cloned()
            .unwrap_or_else(|| state.value.clone())
    }

    /// Describe `value` against the current selection.
    pub fn item(&self, value: &str) -> OptionItem {
        let state = self.state.borrow();
        let index = state.options.get_index_of(value);
        OptionItem {
            value: value.to_string(),
            label: state
                .options
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_string()),
            is_selected: state.value == value,
            is_highlighted: state.open && index == Some(state.highlighted),
        }
    }

    pub fn items(&self) -> Vec<OptionItem> {
        let values: Vec<String> = self.state.borrow().options.keys().cloned().collect();
        values.iter().map(|v| self.item(v)).collect()
    }

    pub fn option_count(&self) -> usize {
        self.state.borrow().options.len()
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    pub fn highlight_next(&self) {
        let mut state = self.state.borrow_mut();
        if state.open && state.highlighted + 1 < state.options.len() {
            state.highlighted += 1;
        }
    }

    pub fn highlight_prev(&self) {
        let mut state = self.state.borrow_mut();
        if state.open {
            state.highlighted = state.highlighted.saturating_sub(1);
        }
    }

    /// Choose the highlighted option, if the list is open.
    pub fn activate_highlighted(&self) {
        let value = {
            let state = self.state.borrow();
            if !state.open {
                return;
            }
            state
                .options
                .get_index(state.highlighted)
                .map(|(v, _)| v.clone())
        };
        if let Some(value) = value {
            self.select(&value);
        }
    }

    // -----------------------------------------------------------------------
    // Geometry and pointer routing
    // -----------------------------------------------------------------------

    pub fn set_trigger_area(&self, area: Rect) {
        self.state.borrow_mut().trigger_area = Some(area);
    }

    pub fn trigger_area(&self) -> Option<Rect> {
        self.state.borrow().trigger_area
    }

    /// Record the bordered list box. Options occupy one row each, starting on
    /// the row below the top border.
    pub fn set_list_area(&self, area: Rect) {
        self.state.borrow_mut().list_area = Some(area);
    }

    pub fn list_area(&self) -> Option<Rect> {
        self.state.borrow().list_area
    }

    /// Height of the bordered list box for the current options.
    pub fn list_height(&self) -> u16 {
        self.option_count() as u16 + 2
    }

    fn value_at(&self, position: Position) -> Option<String> {
        let state = self.state.borrow();
        let area = state.list_area?;
        if !area.contains(position) || position.y == area.y {
            return None;
        }
        let row = (position.y - area.y - 1) as usize;
        state.options.get_index(row).map(|(v, _)| v.clone())
    }

    /// Component-level press handling: the trigger toggles the list, an option
    /// row selects. Returns whether the press hit this select.
    pub fn handle_press(&self, position: Position) -> bool {
        if self.trigger_area().is_some_and(|a| a.contains(position)) {
            self.toggle_open();
            return true;
        }
        if !self.is_open() {
            return false;
        }
        if let Some(value) = self.value_at(position) {
            self.select(&value);
            return true;
        }
        self.list_area().is_some_and(|a| a.contains(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dismiss::PointerEvent;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn priority_select(listeners: &PointerListeners, value: &str) -> Select {
        Select::new(listeners, value)
            .option("high", "High")
            .option("medium", "Medium")
            .option("low", "Low")
    }

    fn recording(select: Select) -> (Select, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let select = select.on_value_change(move |v| sink.borrow_mut().push(v.to_string()));
        (select, seen)
    }

    #[test]
    fn end_to_end_priority_pick() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_open(true);

        let items = select.items();
        let selected: Vec<(&str, bool)> = items
            .iter()
            .map(|i| (i.value.as_str(), i.is_selected))
            .collect();
        assert_eq!(
            selected,
            vec![("high", false), ("medium", true), ("low", false)]
        );

        select.select("high");
        assert_eq!(*seen.borrow(), vec!["high".to_string()]);
        assert!(!select.is_open());
        assert!(listeners.is_empty());
    }

    #[test]
    fn select_reports_before_closing() {
        let listeners = PointerListeners::new();
        let slot: Rc<RefCell<Option<Select>>> = Rc::new(RefCell::new(None));
        let open_during_callback = Rc::new(Cell::new(None));
        let s = Rc::clone(&slot);
        let o = Rc::clone(&open_during_callback);
        let select = priority_select(&listeners, "low").on_value_change(move |_| {
            o.set(s.borrow().as_ref().map(Select::is_open));
        });
        *slot.borrow_mut() = Some(select.clone());

        select.set_open(true);
        select.select("high");

        // The callback ran while the list was still open; by the time control
        // returns both effects are applied.
        assert_eq!(open_during_callback.get(), Some(true));
        assert!(!select.is_open());
    }

    #[test]
    fn owner_that_ignores_callback_keeps_old_label() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_open(true);
        select.select("low");

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(select.value(), "medium");
        assert_eq!(select.trigger_label(), "Medium");

        select.set_value("low");
        assert_eq!(select.trigger_label(), "Low");
    }

    #[test]
    fn no_handler_still_closes() {
        let listeners = PointerListeners::new();
        let select = priority_select(&listeners, "medium");
        select.set_open(true);
        select.select("high");
        assert!(!select.is_open());
        assert_eq!(select.value(), "medium");
    }

    #[test]
    fn set_open_never_touches_value() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_open(true);
        select.set_open(false);
        select.toggle_open();
        assert_eq!(select.value(), "medium");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn repeated_open_close_leaves_no_listeners() {
        let listeners = PointerListeners::new();
        let select = priority_select(&listeners, "medium");
        for _ in 0..50 {
            select.set_open(true);
            assert_eq!(listeners.len(), 1);
            select.set_open(true);
            assert_eq!(listeners.len(), 1);
            select.set_open(false);
        }
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn dropping_open_select_releases_listener() {
        let listeners = PointerListeners::new();
        let select = priority_select(&listeners, "medium");
        let other_handle = select.clone();
        select.set_open(true);
        drop(select);
        assert_eq!(listeners.len(), 1);
        drop(other_handle);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn outside_press_closes_and_releases() {
        let listeners = PointerListeners::new();
        let select = priority_select(&listeners, "medium");
        select.set_trigger_area(Rect::new(0, 0, 20, 1));
        select.set_open(true);
        select.set_list_area(Rect::new(0, 1, 20, select.list_height()));

        listeners.dispatch(&PointerEvent::at(5, 0));
        assert!(select.is_open());
        listeners.dispatch(&PointerEvent::at(5, 3));
        assert!(select.is_open());

        listeners.dispatch(&PointerEvent::at(40, 10));
        assert!(!select.is_open());
        assert!(listeners.is_empty());
    }

    #[test]
    fn independent_selects_do_not_interfere() {
        let listeners = PointerListeners::new();
        let a = priority_select(&listeners, "high");
        let b = priority_select(&listeners, "low");
        a.set_trigger_area(Rect::new(0, 0, 10, 1));
        b.set_trigger_area(Rect::new(20, 0, 10, 1));
        a.set_open(true);
        b.set_open(true);
        assert_eq!(listeners.len(), 2);

        // A press on b's trigger is outside a only.
        listeners.dispatch(&PointerEvent::at(21, 0));
        assert!(!a.is_open());
        assert!(b.is_open());
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn press_routing_on_trigger_and_rows() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_trigger_area(Rect::new(0, 0, 20, 1));

        assert!(select.handle_press(Position::new(3, 0)));
        assert!(select.is_open());
        select.set_list_area(Rect::new(0, 1, 20, select.list_height()));

        // Top border: inside the list, not an option.
        assert!(select.handle_press(Position::new(3, 1)));
        assert!(select.is_open());

        // Third option row.
        assert!(select.handle_press(Position::new(3, 4)));
        assert_eq!(*seen.borrow(), vec!["low".to_string()]);
        assert!(!select.is_open());

        assert!(!select.handle_press(Position::new(50, 4)));
    }

    #[test]
    fn keyboard_highlight_starts_at_current_value() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_open(true);
        assert!(select.item("medium").is_highlighted);

        select.highlight_next();
        select.highlight_next();
        assert!(select.item("low").is_highlighted);
        select.highlight_prev();
        select.activate_highlighted();
        assert_eq!(*seen.borrow(), vec!["medium".to_string()]);
        assert!(!select.is_open());

        // Closed list: activation does nothing.
        select.activate_highlighted();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn option_item_activation_selects() {
        let listeners = PointerListeners::new();
        let (select, seen) = recording(priority_select(&listeners, "medium"));
        select.set_open(true);
        select.item("high").activate(&select);
        assert_eq!(*seen.borrow(), vec!["high".to_string()]);
        assert!(!select.is_open());
    }

    #[test]
    fn trigger_label_fallbacks() {
        let listeners = PointerListeners::new();
        let select = priority_select(&listeners, "").placeholder("Priority");
        assert_eq!(select.trigger_label(), "Priority");
        select.set_value("urgent");
        assert_eq!(select.trigger_label(), "urgent");
        select.set_value("high");
        assert_eq!(select.trigger_label(), "High");
    }

    #[test]
    fn callback_may_update_value_reentrantly() {
        let listeners = PointerListeners::new();
        let slot: Rc<RefCell<Option<Select>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        let select = priority_select(&listeners, "medium").on_value_change(move |v| {
            if let Some(select) = s.borrow().as_ref() {
                select.set_value(v);
            }
        });
        *slot.borrow_mut() = Some(select.clone());

        select.set_open(true);
        select.select("high");
        assert_eq!(select.value(), "high");
        assert_eq!(select.trigger_label(), "High");
        slot.borrow_mut().take();
    }
}
