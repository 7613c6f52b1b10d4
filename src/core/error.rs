//! Error types for the orchestrator and configuration loading.

use crate::handler::State;
use thiserror::Error;

/// Failures raised by [`crate::handler::MiniGameHandler`].
///
/// `IllegalState` means the driver called a transition out of order. It is
/// logged when raised and is not meant to be recovered from.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HandlerError {
    #[error("incorrect state: {found:?} (expected: {expected:?})")]
    IllegalState { expected: State, found: State },

    #[error("no {0} language was given")]
    MissingLanguage(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}
