mod init;
pub use init::{cmd_init, init_workspace};

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::logging;
use crate::io::workspace_io::{self, WorkspaceError};
use crate::model::filter::TaskFilter;
use crate::model::task::{TaskCreate, TaskPriority, TaskStatus, TaskUpdate};
use crate::model::workspace::Workspace;
use crate::ops::task_ops;
use crate::util::dates::parse_due;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run a subcommand. `Init` works without an existing workspace; every
/// other command discovers one first.
pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.workspace_dir.as_deref())?;

    let Some(command) = cli.command else {
        return Err("no subcommand given (try `wl --help`)".into());
    };
    match command {
        Commands::Init(args) => cmd_init(args, &start),
        Commands::List(args) => cmd_list(&load_workspace_from(&start)?, args, json),
        Commands::Show(args) => cmd_show(&load_workspace_from(&start)?, args, json),
        Commands::Today => cmd_today(&load_workspace_from(&start)?, json),
        Commands::Stats => cmd_stats(&load_workspace_from(&start)?, json),
        Commands::Add(args) => cmd_add(&mut load_workspace_from(&start)?, args, json),
        Commands::Edit(args) => cmd_edit(&mut load_workspace_from(&start)?, args, json),
        Commands::Done(args) => cmd_done(&mut load_workspace_from(&start)?, args, json),
        Commands::Rm(args) => cmd_rm(&mut load_workspace_from(&start)?, args, json),
    }
}

/// Directory to start workspace discovery from: `-C` or the cwd
pub fn start_dir(workspace_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match workspace_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e).into()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Discover and load the workspace above `start`, then start file logging.
pub fn load_workspace_from(start: &Path) -> Result<Workspace, WorkspaceError> {
    let root = workspace_io::discover_workspace(start)?;
    let workspace = workspace_io::load_workspace(&root)?;
    logging::init_logging(&workspace.data_dir)?;
    Ok(workspace)
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(s).ok_or_else(|| format!("invalid status '{}' (todo, doing, done)", s))
}

fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(s).ok_or_else(|| format!("invalid priority '{}' (high, medium, low)", s))
}

fn parse_due_arg(s: &str) -> Result<chrono::DateTime<Utc>, String> {
    parse_due(s).ok_or_else(|| format!("invalid due date '{}' (YYYY-MM-DD or YYYY-MM-DDTHH:MM)", s))
}

/// Items before 1-based `page`. Saturates for absurd page numbers.
fn page_skip(page: usize, limit: usize) -> usize {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Empty string means "clear"
fn optional_text(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(workspace: &Workspace, args: ListArgs, json: bool) -> CmdResult {
    let filter = TaskFilter {
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        search: args.search,
    };
    let limit = args.limit.unwrap_or(workspace.config.ui.page_size).max(1);
    let skip = page_skip(args.page, limit);
    let page = task_ops::list_tasks(&workspace.tasks, &filter, skip, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        println!("{}", format_page(&page));
    }
    Ok(())
}

fn cmd_show(workspace: &Workspace, args: IdArgs, json: bool) -> CmdResult {
    let id = task_ops::resolve_id(&workspace.tasks, &args.id)?;
    let task = task_ops::find_task(&workspace.tasks, id)
        .ok_or_else(|| task_ops::TaskError::NotFound(args.id.clone()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{}", format_task_detail(task));
    }
    Ok(())
}

fn cmd_today(workspace: &Workspace, json: bool) -> CmdResult {
    let tasks = task_ops::today_tasks(&workspace.tasks, Utc::now());
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        println!("{}", format_today(&tasks));
    }
    Ok(())
}

fn cmd_stats(workspace: &Workspace, json: bool) -> CmdResult {
    let stats = task_ops::stats(&workspace.tasks, Utc::now());
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", format_stats(&stats));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(workspace: &mut Workspace, args: AddArgs, json: bool) -> CmdResult {
    let input = TaskCreate {
        title: args.title,
        description: args.description,
        status: args.status.as_deref().map(parse_status).transpose()?.unwrap_or_default(),
        priority: args
            .priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .unwrap_or_default(),
        due_date: args.due.as_deref().map(parse_due_arg).transpose()?,
    };
    let id = task_ops::create_task(&mut workspace.tasks, input, Utc::now())?;
    workspace_io::save_tasks(workspace)?;
    print_task(workspace, id, json)
}

fn cmd_edit(workspace: &mut Workspace, args: EditArgs, json: bool) -> CmdResult {
    let id = task_ops::resolve_id(&workspace.tasks, &args.id)?;
    let update = TaskUpdate {
        title: args.title,
        description: args.description.map(optional_text),
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        due_date: args
            .due
            .map(|s| optional_text(s).as_deref().map(parse_due_arg).transpose())
            .transpose()?,
        order: None,
    };
    if update.is_empty() {
        return Err("nothing to change (pass --title, --description, --priority, --status or --due)".into());
    }
    task_ops::update_task(&mut workspace.tasks, id, update, Utc::now())?;
    workspace_io::save_tasks(workspace)?;
    print_task(workspace, id, json)
}

fn cmd_done(workspace: &mut Workspace, args: IdArgs, json: bool) -> CmdResult {
    let id = task_ops::resolve_id(&workspace.tasks, &args.id)?;
    let update = TaskUpdate {
        status: Some(TaskStatus::Done),
        ..Default::default()
    };
    task_ops::update_task(&mut workspace.tasks, id, update, Utc::now())?;
    workspace_io::save_tasks(workspace)?;
    print_task(workspace, id, json)
}

fn cmd_rm(workspace: &mut Workspace, args: IdArgs, json: bool) -> CmdResult {
    let id = task_ops::resolve_id(&workspace.tasks, &args.id)?;
    let task = task_ops::delete_task(&mut workspace.tasks, id)?;
    workspace_io::save_tasks(workspace)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("Deleted {} {}", task.short_id(), task.title);
    }
    Ok(())
}

fn print_task(workspace: &Workspace, id: uuid::Uuid, json: bool) -> CmdResult {
    let task = task_ops::find_task(&workspace.tasks, id)
        .ok_or_else(|| task_ops::TaskError::NotFound(id.to_string()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn optional_text_treats_blank_as_clear() {
        assert_eq!(optional_text("  ".into()), None);
        assert_eq!(optional_text("x".into()), Some("x".into()));
    }

    #[test]
    fn page_skip_saturates() {
        assert_eq!(page_skip(0, 20), 0);
        assert_eq!(page_skip(3, 20), 40);
        assert_eq!(page_skip(usize::MAX, usize::MAX), usize::MAX);
    }

    #[test]
    fn argument_parsers_report_bad_values() {
        assert_eq!(parse_status("Doing"), Ok(TaskStatus::Doing));
        assert!(parse_status("blocked").unwrap_err().contains("blocked"));
        assert_eq!(parse_priority("LOW"), Ok(TaskPriority::Low));
        assert!(parse_due_arg("someday").is_err());
    }
}
