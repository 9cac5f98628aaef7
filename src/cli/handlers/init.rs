use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::CONFIG_TEMPLATE;
use crate::io::workspace_io::{self, DATA_DIR, WorkspaceError};

/// Create `worklog/` with a commented config.toml and an empty tasks.json.
///
/// With `--force` the config is rewritten but existing tasks are kept.
pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    init_workspace(root, args.force)?;
    println!("Initialized worklog in {}", root.join(DATA_DIR).display());
    Ok(())
}

pub fn init_workspace(root: &Path, force: bool) -> Result<(), WorkspaceError> {
    let data_dir = root.join(DATA_DIR);
    if data_dir.is_dir() && !force {
        return Err(WorkspaceError::AlreadyInitialized(root.to_path_buf()));
    }
    fs::create_dir_all(&data_dir)?;
    workspace_io::atomic_write(&data_dir.join("config.toml"), CONFIG_TEMPLATE.as_bytes())?;

    let tasks_path = data_dir.join("tasks.json");
    if !tasks_path.exists() {
        workspace_io::write_tasks(&tasks_path, &[])?;
    }
    tracing::info!(root = %root.display(), force, "workspace initialized");
    Ok(())
}
