//! Diagnostic command shell for the Papilio template peripheral.

use tracing_subscriber as _;

/// Line-oriented text channel contract and implementations.
pub mod channel;
/// Built-in device verbs.
pub mod commands;
/// JSON configuration for the shell binary.
pub mod config;
/// Structured shell error types.
pub mod error;
/// Numeric argument parsing.
pub mod parse;
/// `(module, verb)` command table.
pub mod registry;
/// Command dispatcher.
pub mod shell;
/// Guided tutorial state machine.
pub mod tutorial;

pub use channel::{BufferedChannel, LineInput, StdioChannel, TextChannel};
pub use config::ShellConfig;
pub use error::{ConfigError, ParseValueError, RegistryError, ShellError};
pub use parse::{parse_value, parse_value_strict};
pub use registry::{CommandDescriptor, CommandRegistry, Handler};
pub use shell::{
    is_exit_word, CommandShell, DispatchOutcome, ShellOptions, DEFAULT_MODULE, NOT_INITIALIZED,
};
pub use tutorial::{StepAction, TutorialRunner, TutorialState, TutorialStep, TUTORIAL_STEPS};

#[cfg(test)]
use proptest as _;
