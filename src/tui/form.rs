use std::sync::mpsc::Sender;

use crate::model::task::{Task, TaskCreate, TaskPriority, TaskStatus, TaskUpdate};
use crate::ui::{PointerListeners, Select};
use crate::util::dates::{format_due_input, parse_due};
use crate::util::unicode::pop_grapheme;

use super::app::Action;

/// Focusable parts of the task form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    Status,
    Due,
    Save,
    Cancel,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Status,
        FormField::Due,
        FormField::Save,
        FormField::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Priority => "Priority",
            FormField::Status => "Status",
            FormField::Due => "Due",
            FormField::Save => "Save",
            FormField::Cancel => "Cancel",
        }
    }

    fn offset(self, by: isize) -> FormField {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ALL[(idx + by).rem_euclid(len) as usize]
    }
}

/// Contents of the create / edit dialog. The two selects report changes as
/// [`Action`]s; the app pushes the chosen value back with `set_value`.
#[derive(Debug)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due: String,
    pub priority: Select,
    pub status: Select,
    pub focus: FormField,
    /// Last validation failure, shown under the fields
    pub error: Option<String>,
}

impl TaskForm {
    /// Empty form with default priority and status
    pub fn blank(listeners: &PointerListeners, actions: &Sender<Action>) -> Self {
        Self::build(
            listeners,
            actions,
            String::new(),
            String::new(),
            String::new(),
            TaskPriority::default(),
            TaskStatus::default(),
        )
    }

    /// Form pre-filled from an existing task
    pub fn for_task(listeners: &PointerListeners, actions: &Sender<Action>, task: &Task) -> Self {
        Self::build(
            listeners,
            actions,
            task.title.clone(),
            task.description.clone().unwrap_or_default(),
            task.due_date.as_ref().map(format_due_input).unwrap_or_default(),
            task.priority,
            task.status,
        )
    }

    fn build(
        listeners: &PointerListeners,
        actions: &Sender<Action>,
        title: String,
        description: String,
        due: String,
        priority: TaskPriority,
        status: TaskStatus,
    ) -> Self {
        let tx = actions.clone();
        let priority = TaskPriority::ALL
            .iter()
            .fold(Select::new(listeners, priority.as_str()), |s, p| {
                s.option(p.as_str(), p.label())
            })
            .placeholder("Priority")
            .on_value_change(move |v| {
                let _ = tx.send(Action::FormPriority(v.to_string()));
            });
        let tx = actions.clone();
        let status = TaskStatus::ALL
            .iter()
            .fold(Select::new(listeners, status.as_str()), |s, st| {
                s.option(st.as_str(), st.label())
            })
            .placeholder("Status")
            .on_value_change(move |v| {
                let _ = tx.send(Action::FormStatus(v.to_string()));
            });

        TaskForm {
            title,
            description,
            due,
            priority,
            status,
            focus: FormField::Title,
            error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Focus and editing
    // -----------------------------------------------------------------------

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.offset(1));
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.offset(-1));
    }

    /// Move focus, closing any option list left behind
    pub fn set_focus(&mut self, field: FormField) {
        self.priority.set_open(false);
        self.status.set_open(false);
        self.focus = field;
    }

    /// The select under focus, if any
    pub fn focused_select(&self) -> Option<&Select> {
        match self.focus {
            FormField::Priority => Some(&self.priority),
            FormField::Status => Some(&self.status),
            _ => None,
        }
    }

    /// The select whose option list is showing, if any
    pub fn open_select(&self) -> Option<&Select> {
        [&self.priority, &self.status]
            .into_iter()
            .find(|s| s.is_open())
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Due => Some(&mut self.due),
            _ => None,
        }
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Description => Some(&self.description),
            FormField::Due => Some(&self.due),
            _ => None,
        }
    }

    /// Type into the focused text field. Returns false when focus is elsewhere.
    pub fn insert_char(&mut self, c: char) -> bool {
        match self.focused_text() {
            Some(text) => {
                text.push(c);
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            pop_grapheme(text);
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn validated(&self) -> Result<Validated, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let due = self.due.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            Some(parse_due(due).ok_or("Due date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM")?)
        };
        let description = self.description.trim();
        Ok(Validated {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            priority: TaskPriority::parse(&self.priority.value()).unwrap_or_default(),
            status: TaskStatus::parse(&self.status.value()).unwrap_or_default(),
            due_date,
        })
    }

    pub fn to_create(&self) -> Result<TaskCreate, String> {
        let v = self.validated()?;
        Ok(TaskCreate {
            title: v.title,
            description: v.description,
            status: v.status,
            priority: v.priority,
            due_date: v.due_date,
        })
    }

    /// Every field is sent; unchanged values are no-ops in the store.
    pub fn to_update(&self) -> Result<TaskUpdate, String> {
        let v = self.validated()?;
        Ok(TaskUpdate {
            title: Some(v.title),
            description: Some(v.description),
            status: Some(v.status),
            priority: Some(v.priority),
            due_date: Some(v.due_date),
            order: None,
        })
    }
}

struct Validated {
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    due_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use uuid::Uuid;

    fn blank() -> (TaskForm, mpsc::Receiver<Action>, PointerListeners) {
        let listeners = PointerListeners::new();
        let (tx, rx) = mpsc::channel();
        (TaskForm::blank(&listeners, &tx), rx, listeners)
    }

    #[test]
    fn blank_form_uses_defaults() {
        let (form, _rx, _l) = blank();
        assert_eq!(form.priority.trigger_label(), "Medium");
        assert_eq!(form.status.trigger_label(), "To do");
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn title_is_required() {
        let (mut form, _rx, _l) = blank();
        form.title = "   ".into();
        assert_eq!(form.to_create().unwrap_err(), "Title is required");
    }

    #[test]
    fn bad_due_date_is_rejected() {
        let (mut form, _rx, _l) = blank();
        form.title = "Ship".into();
        form.due = "next week".into();
        assert!(form.to_create().unwrap_err().starts_with("Due date"));
    }

    #[test]
    fn create_input_trims_and_maps() {
        let (mut form, _rx, _l) = blank();
        form.title = "  Ship it ".into();
        form.description = "  ".into();
        form.priority.set_value("high");
        form.due = "2025-06-01".into();
        let input = form.to_create().unwrap();
        assert_eq!(input.title, "Ship it");
        assert_eq!(input.description, None);
        assert_eq!(input.priority, TaskPriority::High);
        assert!(input.due_date.is_some());
    }

    #[test]
    fn select_reports_through_actions() {
        let (form, rx, _l) = blank();
        form.priority.set_open(true);
        form.priority.select("low");
        assert!(!form.priority.is_open());
        assert_eq!(rx.try_recv().unwrap(), Action::FormPriority("low".into()));
        // The owner has not pushed the value back yet
        assert_eq!(form.priority.value(), "medium");
    }

    #[test]
    fn typing_goes_to_focused_text_field() {
        let (mut form, _rx, _l) = blank();
        assert!(form.insert_char('a'));
        form.focus_next();
        assert!(form.insert_char('b'));
        form.focus_next();
        assert!(!form.insert_char('c'));
        assert_eq!(form.title, "a");
        assert_eq!(form.description, "b");
        form.focus_prev();
        form.backspace();
        assert_eq!(form.description, "");
    }

    #[test]
    fn moving_focus_closes_lists() {
        let (mut form, _rx, listeners) = blank();
        form.set_focus(FormField::Priority);
        form.priority.set_open(true);
        assert_eq!(listeners.len(), 1);
        form.focus_next();
        assert_eq!(form.focus, FormField::Status);
        assert!(form.open_select().is_none());
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn focus_wraps() {
        let (mut form, _rx, _l) = blank();
        form.focus_prev();
        assert_eq!(form.focus, FormField::Cancel);
        form.focus_next();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn edit_form_round_trips_task() {
        let listeners = PointerListeners::new();
        let (tx, _rx) = mpsc::channel();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Plan".into(),
            description: Some("Quarter".into()),
            status: TaskStatus::Doing,
            priority: TaskPriority::Low,
            due_date: parse_due("2025-06-01T09:30"),
            completed_at: None,
            order: 0,
            created_at: Utc::now(),
            updated_at: None,
        };
        let form = TaskForm::for_task(&listeners, &tx, &task);
        assert_eq!(form.due, "2025-06-01T09:30");
        let update = form.to_update().unwrap();
        assert_eq!(update.title.as_deref(), Some("Plan"));
        assert_eq!(update.description, Some(Some("Quarter".into())));
        assert_eq!(update.status, Some(TaskStatus::Doing));
        assert_eq!(update.priority, Some(TaskPriority::Low));
        assert_eq!(update.due_date, Some(task.due_date));
    }
}
