//! CLI-specific error types and exit code mapping

use gcplog_core::error::GcpLogError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more entries could not be formatted.
    #[error("format error: {0}")]
    Format(String),

    /// Relabel rule file could not be read or compiled.
    #[error("relabel error: {0}")]
    Relabel(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from gcplog-core.
    #[error("{0}")]
    Core(#[from] GcpLogError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                |
    /// |------|----------------------------------------|
    /// | 0    | Success                                |
    /// | 1    | General / command / format error       |
    /// | 2    | Configuration error                    |
    /// | 10   | IO error                               |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(GcpLogError::Config(_)) => 2,
            Self::Io(_) | Self::Core(GcpLogError::Io(_)) => 10,
            Self::Command(_)
            | Self::Format(_)
            | Self::Relabel(_)
            | Self::JsonSerialize(_)
            | Self::Core(_) => 1,
        }
    }
}
