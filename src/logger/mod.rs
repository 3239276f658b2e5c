//! Structured logging for pumpwatch
//!
//! Colored console output plus an optional file sink, with standard levels
//! (Error/Warning/Info/Debug/Verbose) and per-module debug control via
//! `--debug-<module>` command-line flags.
//!
//! Call [`init`] once at startup, then use the level functions:
//!
//! ```ignore
//! logger::info(LogTag::Monitor, "backfill complete");
//! logger::debug(LogTag::Api, "cache hit for mint ..."); // only with --debug-api
//! log(LogTag::Migration, "CONNECTED", "upstream stream open");
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, init_from_args, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system.
///
/// Parses command-line arguments for debug flags and opens the file sink.
/// Must run before any logging.
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown).
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, "ERROR", message);
}

/// Log at WARNING level.
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, "WARNING", message);
}

/// Log at INFO level (default visibility).
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, "INFO", message);
}

/// Log at DEBUG level. Only shown with `--debug-<module>` for the tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, "DEBUG", message);
}

/// Log at VERBOSE level. Only shown with `--verbose`.
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, "VERBOSE", message);
}

/// Log with an explicit event label, e.g. `log(LogTag::Api, "ROTATE", "...")`.
///
/// Events are emitted at INFO level; the label lands in the second bracket of
/// the log line so related events can be grepped by name.
pub fn log(tag: LogTag, event: &str, message: &str) {
    core::log_internal(tag, LogLevel::Info, event, message);
}

/// Flush pending file writes. Call during shutdown.
pub fn flush() {
    file::flush_file_logging();
}
