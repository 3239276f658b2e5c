//! File sink for log output.
//!
//! Appends plain-text lines to `logs/pumpwatch.log`. Failures here must never
//! disturb the running process: any I/O error disables the sink.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;

static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

fn log_path() -> PathBuf {
    PathBuf::from("logs").join("pumpwatch.log")
}

/// Open the log file for appending. Called once from `logger::init`.
pub fn init_file_logging() {
    if !super::config::get_logger_config().file_enabled {
        return;
    }

    let path = log_path();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(&path);
    if let (Ok(file), Ok(mut guard)) = (file, LOG_FILE.lock()) {
        *guard = Some(file);
    }
}

/// Append one line to the file sink, if it is open.
pub fn write_to_file(line: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            if writeln!(file, "{}", line).is_err() {
                *guard = None;
            }
        }
    }
}

/// Flush buffered writes. Called during shutdown.
pub fn flush_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = file.flush();
        }
    }
}
