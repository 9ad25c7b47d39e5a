//! CLI-specific error types and exit code mapping

use logfwd_core::error::LogfwdError;
use logfwd_serializer::SerializerError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A frame stream could not be split into frames.
    #[error("malformed frame stream: {0}")]
    Frame(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logfwd-core.
    #[error("{0}")]
    Core(#[from] LogfwdError),

    /// Serializer domain error.
    #[error("serializer error: {0}")]
    Serializer(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                    |
    /// |------|----------------------------|
    /// | 0    | Success                    |
    /// | 1    | General / command error    |
    /// | 2    | Configuration error        |
    /// | 3    | Malformed frame stream     |
    /// | 10   | IO error                   |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Core(LogfwdError::Config(_)) => 2,
            Self::Frame(_) => 3,
            Self::Io(_) | Self::Core(LogfwdError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Serializer(_) => 1,
        }
    }
}

impl From<SerializerError> for CliError {
    fn from(e: SerializerError) -> Self {
        match e {
            SerializerError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Serializer(other.to_string()),
        }
    }
}
