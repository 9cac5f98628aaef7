use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wl", about = concat!("worklog v", env!("CARGO_PKG_VERSION"), " - personal task tracking"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a worklog workspace in the current directory
    Init(InitArgs),
    /// List tasks, filtered and paginated
    List(ListArgs),
    /// Show one task
    Show(IdArgs),
    /// Open tasks due today, overdue, or undated, most urgent first
    Today,
    /// Task counts and completion rate
    Stats,
    /// Create a task
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Mark a task done
    Done(IdArgs),
    /// Delete a task
    Rm(IdArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if worklog/ already exists (keeps tasks.json)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status (todo, doing, done)
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by priority (high, medium, low)
    #[arg(long)]
    pub priority: Option<String>,
    /// Case-insensitive text search over title and description
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Tasks per page (default: ui.page_size from config)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id or unique prefix
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    /// high, medium or low
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// todo, doing or done
    #[arg(long)]
    pub status: Option<String>,
    /// Due date: YYYY-MM-DD or YYYY-MM-DDTHH:MM (local time)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id or unique prefix
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    /// New description (empty string clears it)
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// New due date (empty string clears it)
    #[arg(long)]
    pub due: Option<String>,
}
