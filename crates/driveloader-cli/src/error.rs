//! CLI-specific error types and exit code mapping.

use thiserror::Error;

use driveloader_core::config::ConfigError;
use driveloader_core::download::DownloadError;
use driveloader_core::ports::RemotePortError;
use driveloader_core::settings::SettingsError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Resolution or transfer failed for a single-shot command.
    #[error("{0}")]
    Download(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings or instruction file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Drive API rejected our credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The Drive API could not be reached or misbehaved.
    #[error("Remote store error: {0}")]
    Remote(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Download(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Remote(_) => 69,   // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Auth(_) => 77,     // EX_NOPERM
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RemotePortError> for CliError {
    fn from(err: RemotePortError) -> Self {
        match err {
            RemotePortError::AuthRequired { message } => Self::Auth(message),
            RemotePortError::Configuration { message } => Self::Config(message),
            other => Self::Remote(other.to_string()),
        }
    }
}

impl From<DownloadError> for CliError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Io { message, .. } => Self::Io(message),
            other => Self::Download(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
