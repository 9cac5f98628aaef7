//! Controlled tab strip.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use ratatui::layout::{Position, Rect};

use super::ValueChangeFn;

/// One tab as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabTrigger {
    pub value: String,
    pub label: String,
    pub is_active: bool,
}

/// A row of mutually exclusive tabs. The active value belongs to the owner.
pub struct Tabs {
    value: String,
    tabs: IndexMap<String, String>,
    on_value_change: Option<ValueChangeFn>,
    areas: Vec<(Rect, String)>,
}

impl fmt::Debug for Tabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tabs")
            .field("value", &self.value)
            .field("tabs", &self.tabs)
            .finish()
    }
}

impl Tabs {
    pub fn new(value: impl Into<String>) -> Self {
        Tabs {
            value: value.into(),
            tabs: IndexMap::new(),
            on_value_change: None,
            areas: Vec::new(),
        }
    }

    pub fn tab(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.tabs.insert(value.into(), label.into());
        self
    }

    pub fn on_value_change(mut self, f: impl Fn(&str) + 'static) -> Self {
        self.on_value_change = Some(Rc::new(f));
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn triggers(&self) -> Vec<TabTrigger> {
        self.tabs
            .iter()
            .map(|(value, label)| TabTrigger {
                value: value.clone(),
                label: label.clone(),
                is_active: *value == self.value,
            })
            .collect()
    }

    /// Report `value` to the owner.
    pub fn activate(&self, value: &str) {
        if let Some(callback) = &self.on_value_change {
            callback(value);
        }
    }

    /// Activate the tab `offset` places away from the current one, wrapping.
    pub fn cycle(&self, offset: isize) {
        let len = self.tabs.len() as isize;
        if len == 0 {
            return;
        }
        let current = self.tabs.get_index_of(&self.value).unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(len) as usize;
        if let Some((value, _)) = self.tabs.get_index(next) {
            let value = value.clone();
            self.activate(&value);
        }
    }

    /// Record where each tab was drawn this frame.
    pub fn set_areas(&mut self, areas: Vec<(Rect, String)>) {
        self.areas = areas;
    }

    /// Where the tab for `value` was drawn, if it was.
    pub fn area_of(&self, value: &str) -> Option<Rect> {
        self.areas
            .iter()
            .find(|(_, v)| v == value)
            .map(|(area, _)| *area)
    }

    pub fn handle_press(&self, position: Position) -> bool {
        match self.areas.iter().find(|(area, _)| area.contains(position)) {
            Some((_, value)) => {
                self.activate(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn status_tabs(value: &str) -> (Tabs, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let tabs = Tabs::new(value)
            .tab("all", "All")
            .tab("todo", "To do")
            .tab("doing", "Doing")
            .tab("done", "Done")
            .on_value_change(move |v| sink.borrow_mut().push(v.to_string()));
        (tabs, seen)
    }

    #[test]
    fn active_tab_follows_value() {
        let (mut tabs, _) = status_tabs("todo");
        let active: Vec<bool> = tabs.triggers().iter().map(|t| t.is_active).collect();
        assert_eq!(active, vec![false, true, false, false]);

        tabs.set_value("done");
        assert!(tabs.triggers()[3].is_active);
    }

    #[test]
    fn activation_only_reports() {
        let (tabs, seen) = status_tabs("all");
        tabs.activate("doing");
        assert_eq!(*seen.borrow(), vec!["doing".to_string()]);
        assert_eq!(tabs.value(), "all");
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let (tabs, seen) = status_tabs("all");
        tabs.cycle(-1);
        tabs.cycle(1);
        assert_eq!(*seen.borrow(), vec!["done".to_string(), "todo".to_string()]);
    }

    #[test]
    fn press_on_recorded_area() {
        let (mut tabs, seen) = status_tabs("all");
        tabs.set_areas(vec![
            (Rect::new(0, 0, 5, 1), "all".into()),
            (Rect::new(6, 0, 7, 1), "todo".into()),
        ]);
        assert!(tabs.handle_press(Position::new(8, 0)));
        assert!(!tabs.handle_press(Position::new(8, 1)));
        assert_eq!(*seen.borrow(), vec!["todo".to_string()]);
    }
}
