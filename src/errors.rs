//! Crate-level error types.
//!
//! Provider clients deliberately do not use these: their operations fail soft
//! into sentinel values. `PumpwatchError` covers the paths that are allowed
//! to abort startup or surface through the HTTP API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PumpwatchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("webserver error: {0}")]
    Webserver(String),

    #[error("upstream connection error: {0}")]
    Upstream(String),
}

impl PumpwatchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PumpwatchError::Configuration(message.into())
    }
}
