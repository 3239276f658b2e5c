/// Centralized command-line argument handling.
///
/// Stores the argv snapshot in a thread-safe singleton so tests and binaries
/// can override it, and exposes flag/value helpers used by the logger and the
/// webserver for `--debug-<module>` and `--port` style flags.
use std::env;
use std::sync::Mutex;

use once_cell::sync::Lazy;

/// Global command-line arguments storage.
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Override the global arguments (tests and tools).
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Get a copy of the current arguments.
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Whether a specific flag is present.
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following a flag, e.g. `--port 8080`.
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_and_value_parsing() {
        set_cmd_args(vec![
            "pumpwatch".to_string(),
            "--debug-api".to_string(),
            "--port".to_string(),
            "8080".to_string(),
        ]);

        assert!(has_arg("--debug-api"));
        assert!(!has_arg("--debug-rpc"));
        assert_eq!(get_arg_value("--port").as_deref(), Some("8080"));
        assert_eq!(get_arg_value("--missing"), None);
    }
}
