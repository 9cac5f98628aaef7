use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use uuid::Uuid;

use crate::io::logging::init_logging;
use crate::io::workspace_io::{discover_workspace, load_workspace, save_tasks};
use crate::model::filter::TaskFilter;
use crate::model::task::{Page, Task, TaskPriority, TaskStats, TaskStatus};
use crate::model::workspace::Workspace;
use crate::ops::task_ops;
use crate::ui::{
    Button, Overlay, OverlayProps, PointerListeners, Select, Tabs, ToastOptions, ToastSender,
    Toaster, Trigger, toast,
};

use super::form::{FormField, TaskForm};
use super::input;
use super::render;
use super::theme::Theme;

/// Value used by the status tabs and priority filter for "no filter"
pub const ALL: &str = "all";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Deferred state changes reported by component callbacks. The app applies
/// them after each event, before the next frame is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StatusFilter(String),
    PriorityFilter(String),
    CreateDialog(bool),
    EditDialog(bool),
    FormPriority(String),
    FormStatus(String),
}

/// Keyboard focus on the tasks page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Search,
}

/// Clickable regions recorded during the last draw
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub new_task: Option<Rect>,
    pub reset_filters: Option<Rect>,
    pub search: Option<Rect>,
    pub prev_page: Option<Rect>,
    pub next_page: Option<Rect>,
    pub rows: Vec<(Rect, Uuid)>,
    pub form_fields: Vec<(Rect, FormField)>,
}

/// Main application state
pub struct App {
    pub workspace: Workspace,
    pub theme: Theme,
    pub should_quit: bool,
    /// Document-level pointer listeners (outside-press dismissal)
    pub listeners: PointerListeners,
    actions_tx: Sender<Action>,
    actions_rx: Receiver<Action>,
    pub toasts: ToastSender,
    pub toaster: Toaster,

    pub filter: TaskFilter,
    /// Zero-based page index
    pub page: usize,
    pub listing: Page<Task>,
    /// Whole-workspace counts for the header
    pub stats: TaskStats,
    pub cursor: usize,
    pub focus: Focus,
    pub search_input: String,

    pub status_tabs: Tabs,
    pub priority_filter: Select,

    /// Uncontrolled: opened by `new_task_button`
    pub create_dialog: Overlay,
    pub new_task_button: Button,
    /// Controlled: open exactly while `editing` is set
    pub edit_dialog: Overlay,
    pub editing: Option<Uuid>,
    pub form: Option<TaskForm>,

    pub hits: HitMap,
}

impl App {
    pub fn new(workspace: Workspace) -> Self {
        let theme = Theme::from_config(&workspace.config.ui);
        let listeners = PointerListeners::new();
        let (actions_tx, actions_rx) = mpsc::channel();
        let (toasts, toaster) = toast::channel(
            workspace.config.toast.max_visible,
            Duration::from_millis(workspace.config.toast.duration_ms),
        );

        let tx = actions_tx.clone();
        let status_tabs = TaskStatus::ALL
            .iter()
            .fold(Tabs::new(ALL).tab(ALL, "All"), |tabs, s| {
                tabs.tab(s.as_str(), s.label())
            })
            .on_value_change(move |v| {
                let _ = tx.send(Action::StatusFilter(v.to_string()));
            });

        let tx = actions_tx.clone();
        let priority_filter = TaskPriority::ALL
            .iter()
            .fold(
                Select::new(&listeners, ALL).option(ALL, "All priorities"),
                |select, p| select.option(p.as_str(), p.label()),
            )
            .on_value_change(move |v| {
                let _ = tx.send(Action::PriorityFilter(v.to_string()));
            });

        let tx = actions_tx.clone();
        let create_dialog = Overlay::new(OverlayProps::uncontrolled().on_open_change(move |open| {
            let _ = tx.send(Action::CreateDialog(open));
        }));
        let new_task_button = Trigger::button(&create_dialog, "+ New task");

        let tx = actions_tx.clone();
        let edit_dialog = Overlay::new(OverlayProps::controlled(false).on_open_change(move |open| {
            let _ = tx.send(Action::EditDialog(open));
        }));

        let mut app = App {
            workspace,
            theme,
            should_quit: false,
            listeners,
            actions_tx,
            actions_rx,
            toasts,
            toaster,
            filter: TaskFilter::default(),
            page: 0,
            listing: Page {
                items: Vec::new(),
                total: 0,
                skip: 0,
                limit: 0,
                has_more: false,
            },
            stats: TaskStats::default(),
            cursor: 0,
            focus: Focus::List,
            search_input: String::new(),
            status_tabs,
            priority_filter,
            create_dialog,
            new_task_button,
            edit_dialog,
            editing: None,
            form: None,
            hits: HitMap::default(),
        };
        app.refresh();
        app
    }

    pub fn page_size(&self) -> usize {
        self.workspace.config.ui.page_size.max(1)
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Recompute the visible page, clamping page and cursor.
    pub fn refresh(&mut self) {
        let size = self.page_size();
        self.listing = task_ops::list_tasks(&self.workspace.tasks, &self.filter, self.page * size, size);
        if self.listing.items.is_empty() && self.page > 0 {
            self.page = self.listing.page_count() - 1;
            self.listing =
                task_ops::list_tasks(&self.workspace.tasks, &self.filter, self.page * size, size);
        }
        self.cursor = self.cursor.min(self.listing.items.len().saturating_sub(1));
        self.stats = task_ops::stats(&self.workspace.tasks, Utc::now());
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.listing.items.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.listing.items.len();
        if len == 0 {
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    pub fn next_page(&mut self) {
        if self.listing.has_more {
            self.page += 1;
            self.cursor = 0;
            self.refresh();
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.cursor = 0;
            self.refresh();
        }
    }

    pub fn set_search(&mut self, text: String) {
        self.search_input = text;
        self.filter.search = Some(self.search_input.clone()).filter(|s| !s.trim().is_empty());
        self.page = 0;
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.filter = TaskFilter::default();
        self.search_input.clear();
        self.status_tabs.set_value(ALL);
        self.priority_filter.set_value(ALL);
        self.page = 0;
        self.cursor = 0;
        self.refresh();
        tracing::debug!("filters reset");
    }

    // -----------------------------------------------------------------------
    // Actions from component callbacks
    // -----------------------------------------------------------------------

    /// Apply every queued action.
    pub fn apply_actions(&mut self) {
        while let Ok(action) = self.actions_rx.try_recv() {
            self.apply(action);
        }
        self.sync_overlays();
    }

    fn apply(&mut self, action: Action) {
        tracing::trace!(?action, "apply");
        match action {
            Action::StatusFilter(value) => {
                self.filter.status = TaskStatus::parse(&value);
                self.status_tabs.set_value(value);
                self.page = 0;
                self.refresh();
            }
            Action::PriorityFilter(value) => {
                self.filter.priority = TaskPriority::parse(&value);
                self.priority_filter.set_value(value);
                self.page = 0;
                self.refresh();
            }
            Action::CreateDialog(true) => {
                self.focus = Focus::List;
                self.form = Some(TaskForm::blank(&self.listeners, &self.actions_tx));
            }
            Action::CreateDialog(false) => {
                self.form = None;
            }
            Action::EditDialog(open) => {
                // Opening is owner-driven through `begin_edit`; only closes arrive here.
                if !open {
                    self.editing = None;
                    self.form = None;
                }
            }
            Action::FormPriority(value) => {
                if let Some(form) = &self.form {
                    form.priority.set_value(value);
                }
            }
            Action::FormStatus(value) => {
                if let Some(form) = &self.form {
                    form.status.set_value(value);
                }
            }
        }
    }

    /// Push owner state into controlled components.
    pub fn sync_overlays(&self) {
        self.edit_dialog.set_open_prop(self.editing.is_some());
    }

    // -----------------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------------

    /// The dialog currently on screen, if any
    pub fn open_dialog(&self) -> Option<Overlay> {
        if self.create_dialog.is_open() {
            Some(self.create_dialog.clone())
        } else if self.edit_dialog.is_open() {
            Some(self.edit_dialog.clone())
        } else {
            None
        }
    }

    pub fn open_create(&self) {
        self.new_task_button.click();
    }

    pub fn begin_edit(&mut self, id: Uuid) {
        let Some(task) = task_ops::find_task(&self.workspace.tasks, id) else {
            return;
        };
        self.form = Some(TaskForm::for_task(&self.listeners, &self.actions_tx, task));
        self.editing = Some(id);
        self.focus = Focus::List;
        self.sync_overlays();
    }

    pub fn close_dialog(&self) {
        if let Some(dialog) = self.open_dialog() {
            dialog.close();
        }
    }

    /// Validate and persist the open form.
    pub fn submit_form(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        let now = Utc::now();

        if self.create_dialog.is_open() {
            let result = form.to_create().and_then(|input| {
                task_ops::create_task(&mut self.workspace.tasks, input, now)
                    .map_err(|e| e.to_string())
            });
            match result {
                Ok(id) => {
                    let title = task_title(&self.workspace.tasks, id);
                    if self.persist() {
                        self.toasts
                            .toast(ToastOptions::title("Task created").description(title));
                    }
                    self.create_dialog.close();
                    self.refresh();
                }
                Err(msg) => self.reject(msg),
            }
        } else if let Some(id) = self.editing {
            let result = form.to_update().and_then(|update| {
                task_ops::update_task(&mut self.workspace.tasks, id, update, now)
                    .map_err(|e| e.to_string())
            });
            match result {
                Ok(()) => {
                    let title = task_title(&self.workspace.tasks, id);
                    if self.persist() {
                        self.toasts
                            .toast(ToastOptions::title("Task updated").description(title));
                    }
                    self.editing = None;
                    self.form = None;
                    self.sync_overlays();
                    self.refresh();
                }
                Err(msg) => self.reject(msg),
            }
        }
    }

    fn reject(&mut self, msg: String) {
        if let Some(form) = &mut self.form {
            form.error = Some(msg.clone());
        }
        self.toasts.toast(
            ToastOptions::title("Could not save task")
                .description(msg)
                .destructive(),
        );
    }

    // -----------------------------------------------------------------------
    // List commands
    // -----------------------------------------------------------------------

    pub fn cycle_selected_status(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        let now = Utc::now();
        let Some(task) = self.workspace.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task_ops::cycle_status(task, now);
        let status = task.status;
        if self.persist() {
            self.toasts.toast(
                ToastOptions::title("Status changed").description(format!(
                    "{} is now {}",
                    task_title(&self.workspace.tasks, id),
                    status.label()
                )),
            );
        }
        self.refresh();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match task_ops::delete_task(&mut self.workspace.tasks, id) {
            Ok(task) => {
                if self.persist() {
                    self.toasts.toast(
                        ToastOptions::title("Task deleted")
                            .description(task.title)
                            .destructive(),
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "delete failed"),
        }
        self.refresh();
    }

    /// Write tasks to disk, reporting failure as a toast.
    fn persist(&self) -> bool {
        match save_tasks(&self.workspace) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "saving tasks failed");
                self.toasts.toast(
                    ToastOptions::title("Could not save tasks")
                        .description(e.to_string())
                        .destructive(),
                );
                false
            }
        }
    }

    /// Pull new toasts and expire old ones.
    pub fn tick(&mut self, now: Instant) {
        self.toaster.drain(now);
        self.toaster.prune(now);
    }
}

fn task_title(tasks: &[Task], id: Uuid) -> String {
    task_ops::find_task(tasks, id)
        .map(|t| t.title.clone())
        .unwrap_or_default()
}

/// Run the TUI application
pub fn run(workspace_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start: PathBuf = match workspace_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&start)?;
    let workspace = load_workspace(&root)?;
    init_logging(&workspace.data_dir)?;
    tracing::info!(root = %root.display(), tasks = workspace.tasks.len(), "tui started");

    let mut app = App::new(workspace);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    tracing::info!("tui stopped");

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        // Wake up in time to expire the next toast
        let timeout = app
            .toaster
            .next_expiry()
            .map(|at| at.saturating_duration_since(Instant::now()))
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
            app.apply_actions();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
