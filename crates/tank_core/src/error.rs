//! Error types for the tank simulation.

use thiserror::Error;

use crate::tank::TankId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all tank simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A tank or simulation configuration was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid tank reference.
    #[error("Tank not found: {0}")]
    TankNotFound(TankId),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to read a data file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
