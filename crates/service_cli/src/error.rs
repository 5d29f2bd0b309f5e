//! CLI error type.

use roi_core::types::{ConfigError, EngineError};
use thiserror::Error;

/// Everything that can stop a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file missing.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Input file unreadable or malformed.
    #[error("Failed to read '{path}': {reason}")]
    Input {
        /// File path
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Bad command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Engine configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Calculation failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Result serialisation failure.
    #[error("Failed to serialise output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
