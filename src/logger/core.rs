//! Central log filtering.
//!
//! Filtering rules:
//! 1. Errors are always shown.
//! 2. Everything else passes the minimum-level threshold.
//! 3. Debug requires `--debug-<key>` for the tag (or `--debug-all`).
//! 4. Verbose requires `--verbose`.

use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(tag);
    }

    if level == LogLevel::Verbose {
        return config.min_level == LogLevel::Verbose;
    }

    level <= config.min_level
}

pub fn log_internal(tag: LogTag, level: LogLevel, event: &str, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, event, message);
}
