//! Application-wide error types using thiserror.

use txstats_common::TxError;
use txstats_config::ConfigError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Error raised by the statistics pipeline.
    #[error(transparent)]
    Core(#[from] TxError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
