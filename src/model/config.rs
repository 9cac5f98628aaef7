use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from worklog/config.toml. Every field has a default, so an
/// empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub toast: ToastConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tasks per page in the list and in `wl list`
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Show the key hint line at the bottom of the screen
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Color overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            page_size: default_page_size(),
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// How many notifications are shown at once
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    /// How long each notification stays up
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            max_visible: default_max_visible(),
            duration_ms: default_duration_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    20
}

fn default_max_visible() -> usize {
    5
}

fn default_duration_ms() -> u64 {
    4000
}
