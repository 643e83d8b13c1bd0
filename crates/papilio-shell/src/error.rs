use std::path::PathBuf;

use thiserror::Error;

/// Command table configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A `(module, verb)` pair was registered twice.
    #[error("command '{module} {verb}' is already registered")]
    Duplicate {
        /// Module namespace of the rejected command.
        module: String,
        /// Verb of the rejected command.
        verb: String,
    },
    /// Module or verb was empty or contained whitespace.
    #[error("invalid command key '{module} {verb}'")]
    InvalidKey {
        /// Module namespace as supplied.
        module: String,
        /// Verb as supplied.
        verb: String,
    },
}

/// Rejection reasons for strictly parsed numeric arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    /// No digits followed the optional `0x` prefix.
    #[error("missing digits in '{0}'")]
    Empty(String),
    /// A character is not a digit in the selected radix.
    #[error("invalid digit in '{0}'")]
    InvalidDigit(String),
    /// The value does not fit in 32 bits.
    #[error("value '{0}' does not fit in 32 bits")]
    Overflow(String),
}

/// Failures while loading a shell configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    /// The configured base address leaves no room for the register window.
    #[error(transparent)]
    Driver(#[from] papilio_core::DriverError),
}

/// Shell construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The command table could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
