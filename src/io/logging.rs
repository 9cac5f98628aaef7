use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `worklog=debug`
pub const LOG_ENV: &str = "WORKLOG_LOG";

/// Send `tracing` output to `worklog/worklog.log`. The terminal belongs to
/// the TUI, so nothing is ever written to stdout or stderr.
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init_logging(data_dir: &Path) -> io::Result<()> {
    let log_path = data_dir.join("worklog.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("logging already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_log_file() {
        let tmp = TempDir::new().unwrap();
        init_logging(tmp.path()).unwrap();
        assert!(tmp.path().join("worklog.log").exists());
        // A second call must not fail even though a subscriber is set.
        init_logging(tmp.path()).unwrap();
    }
}
