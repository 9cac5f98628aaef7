use std::fs;
use std::path::Path;

use crate::io::workspace_io::WorkspaceError;
use crate::model::config::Config;

/// Default config.toml written by `wl init`
pub const CONFIG_TEMPLATE: &str = r##"# WorkLog configuration. Every setting is optional.

[ui]
# Tasks per page
page_size = 20
# Show the key hint line at the bottom of the screen
show_key_hints = true

# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"

[toast]
# Notifications shown at once, and how long each stays up
max_visible = 5
duration_ms = 4000
"##;

/// Read config.toml from the data directory. A missing file yields defaults.
pub fn read_config(data_dir: &Path) -> Result<Config, WorkspaceError> {
    let config_path = data_dir.join("config.toml");
    if !config_path.exists() {
        return Ok(Config::default());
    }
    let config_text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&config_text)?;
    Ok(config)
}
