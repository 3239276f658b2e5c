//! Log formatting and output.
//!
//! Colorized console lines with aligned tag and event columns, mirrored to
//! the file sink without ANSI codes. Broken pipes (piped output closed) exit
//! quietly instead of panicking.

use std::io::{stdout, ErrorKind, Write};

use chrono::Local;
use colored::*;

use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;

const TAG_WIDTH: usize = 10;
const EVENT_WIDTH: usize = 12;

pub fn format_and_log(tag: LogTag, level: LogLevel, event: &str, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let console_line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        format_tag(&tag),
        format_event(level, event),
        message
    );
    print_stdout_safe(&console_line);

    let file_line = format!(
        "{} [{}] [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        tag.display_name(),
        event,
        message
    );
    write_to_file(&file_line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.display_name(), width = TAG_WIDTH);
    match tag {
        LogTag::System => padded.bright_yellow().bold(),
        LogTag::Api => padded.bright_purple().bold(),
        LogTag::Rpc => padded.bright_cyan().bold(),
        LogTag::SolPrice => padded.bright_yellow().bold(),
        LogTag::Migration => padded.bright_blue().bold(),
        LogTag::Enrich => padded.bright_white().bold(),
        LogTag::Scoring => padded.bright_magenta().bold(),
        LogTag::Monitor => padded.bright_cyan().bold(),
        LogTag::Webserver => padded.bright_green().bold(),
        LogTag::Stream => padded.bright_green().bold(),
        LogTag::Test => padded.bright_blue().bold(),
    }
}

fn format_event(level: LogLevel, event: &str) -> ColoredString {
    let padded = format!("{:<width$}", event, width = EVENT_WIDTH);
    match level {
        LogLevel::Error => padded.bright_red().bold(),
        LogLevel::Warning => padded.bright_yellow().bold(),
        _ => padded.white().bold(),
    }
}

/// Print to stdout but treat a broken pipe as a clean exit.
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
