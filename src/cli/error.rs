//! CLI-level errors (wraps configuration and settings errors)

use thiserror::Error;

use crate::config::SettingsError;
use crate::domain::ConfigError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("cannot render {format}: {reason}")]
    Render { format: String, reason: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Settings(_) => crate::exitcode::CONFIG,
            CliError::Render { .. } => crate::exitcode::DATAERR,
            CliError::Config(e) => match e {
                ConfigError::Read { .. } => crate::exitcode::NOINPUT,
                ConfigError::Decode { .. } => crate::exitcode::DATAERR,
                ConfigError::InvalidLayers { .. } => crate::exitcode::USAGE,
                e if e.is_key_error() => crate::exitcode::DATAERR,
                _ => crate::exitcode::SOFTWARE,
            },
        }
    }
}
