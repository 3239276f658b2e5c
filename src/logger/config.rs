//! Logger configuration parsed from command-line arguments.

use std::collections::HashSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;

/// Runtime logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level shown on the console (Error always passes).
    pub min_level: LogLevel,
    /// Tags with debug logging enabled via `--debug-<key>`.
    pub debug_tags: HashSet<String>,
    /// Whether the file sink is enabled.
    pub file_enabled: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            file_enabled: true,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the logger configuration from the process arguments.
///
/// Recognized flags: `--quiet`, `--verbose`, `--debug-all`, `--debug-<key>`
/// for every [`LogTag`] debug key, and `--no-log-file`.
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    if arguments::has_arg("--quiet") {
        config.min_level = LogLevel::Warning;
    }
    if arguments::has_arg("--verbose") {
        config.min_level = LogLevel::Verbose;
    }
    if arguments::has_arg("--no-log-file") {
        config.file_enabled = false;
    }

    for arg in arguments::get_cmd_args() {
        if let Some(key) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(key.to_string());
        }
    }

    set_logger_config(config);
}

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut guard) = LOGGER_CONFIG.write() {
        *guard = config;
    }
}

/// Whether debug logging is enabled for the given tag.
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_tags.contains("all") || config.debug_tags.contains(tag.to_debug_key())
}
