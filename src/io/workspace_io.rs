use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::io::config_io::read_config;
use crate::model::task::Task;
use crate::model::workspace::Workspace;

/// Name of the data directory inside a workspace root
pub const DATA_DIR: &str = "worklog";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a worklog workspace: no worklog/ directory found (run `wl init`)")]
    NotAWorkspace,
    #[error("worklog/ already exists in {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    TasksParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// On-disk layout of tasks.json
#[derive(Debug, Default, Serialize, Deserialize)]
struct TasksFile {
    #[serde(default)]
    tasks: Vec<Task>,
}

/// Walk up from `start` looking for a directory that contains `worklog/`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DATA_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load config and tasks from the workspace at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let data_dir = root.join(DATA_DIR);
    if !data_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&data_dir)?;
    let tasks = read_tasks(&data_dir.join("tasks.json"))?;
    tracing::debug!(root = %root.display(), tasks = tasks.len(), "workspace loaded");
    Ok(Workspace {
        root: root.to_path_buf(),
        data_dir,
        config,
        tasks,
    })
}

/// Read tasks.json. A missing file means no tasks yet.
pub fn read_tasks(path: &Path) -> Result<Vec<Task>, WorkspaceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file: TasksFile =
        serde_json::from_str(&text).map_err(|e| WorkspaceError::TasksParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(file.tasks)
}

/// Persist the workspace's tasks.
pub fn save_tasks(workspace: &Workspace) -> Result<(), WorkspaceError> {
    write_tasks(&workspace.tasks_path(), &workspace.tasks)
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<(), WorkspaceError> {
    let file = TasksFile {
        tasks: tasks.to_vec(),
    };
    let mut content = serde_json::to_string_pretty(&file)?;
    content.push('\n');
    atomic_write(path, content.as_bytes())?;
    tracing::debug!(path = %path.display(), tasks = tasks.len(), "tasks saved");
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
