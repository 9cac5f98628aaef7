use std::path::PathBuf;

use super::config::Config;
use super::task::Task;

/// A loaded WorkLog workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory containing `worklog/`
    pub root: PathBuf,
    /// The `worklog/` directory itself
    pub data_dir: PathBuf,
    pub config: Config,
    pub tasks: Vec<Task>,
}

impl Workspace {
    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }
}
