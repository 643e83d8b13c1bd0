//! Command dispatcher bound to one text channel and an optional driver.

use std::time::Duration;

use papilio_core::{Clock, DeviceControl};
use tracing::debug;

use crate::channel::{LineInput, TextChannel};
use crate::commands::builtin_commands;
use crate::error::{RegistryError, ShellError};
use crate::registry::{CommandDescriptor, CommandRegistry};

/// Printed by every device command when no driver is attached.
pub const NOT_INITIALIZED: &str = "Error: Device not initialized";

/// Module name the built-in commands are registered under by default.
pub const DEFAULT_MODULE: &str = "template";

/// Runtime options for a shell instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOptions {
    /// Module namespace for the built-in verbs.
    pub module: String,
    /// Device name used in help and tutorial banners.
    pub title: String,
    /// Reject malformed `write` values instead of coercing them to zero.
    pub strict_numbers: bool,
    /// Delay after the tutorial intro and after each tutorial step.
    pub tutorial_pacing: Duration,
    /// Sleep between input polls while waiting for a line.
    pub input_poll: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            title: "PapilioTemplate".to_string(),
            strict_numbers: false,
            tutorial_pacing: Duration::from_secs(1),
            input_poll: Duration::from_millis(10),
        }
    }
}

/// What [`CommandShell::dispatch`] did with a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// A registered handler ran.
    Handled,
    /// No tokens were supplied; nothing was printed.
    Empty,
    /// The first token named no registered module.
    UnknownModule,
    /// A module was named without a verb.
    MissingVerb,
    /// The verb is not registered for the module.
    UnknownVerb,
}

/// Text front end that parses command lines and runs their handlers.
pub struct CommandShell<'a> {
    options: ShellOptions,
    registry: CommandRegistry,
    channel: &'a mut dyn TextChannel,
    clock: &'a dyn Clock,
    device: Option<&'a mut dyn DeviceControl>,
}

impl<'a> CommandShell<'a> {
    /// Creates a shell with the built-in verbs registered and no device.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Registry`] when the configured module name is not
    /// a valid command key.
    pub fn new(
        channel: &'a mut dyn TextChannel,
        clock: &'a dyn Clock,
        options: ShellOptions,
    ) -> Result<Self, ShellError> {
        let mut registry = CommandRegistry::new();
        for descriptor in builtin_commands(&options.module) {
            registry.register(descriptor)?;
        }
        Ok(Self {
            options,
            registry,
            channel,
            clock,
            device: None,
        })
    }

    /// Attaches the driver that device commands operate on.
    #[must_use]
    pub fn with_device(mut self, device: &'a mut dyn DeviceControl) -> Self {
        self.device = Some(device);
        self
    }

    /// Replaces the attached driver.
    pub fn attach(&mut self, device: &'a mut dyn DeviceControl) {
        self.device = Some(device);
    }

    /// Detaches the driver; device commands report it as not initialized.
    pub fn detach(&mut self) {
        self.device = None;
    }

    /// Returns `true` when a driver is attached.
    #[must_use]
    pub const fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Registers an additional command.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for duplicate or malformed keys.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        self.registry.register(descriptor)
    }

    /// Command table.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Shell options.
    #[must_use]
    pub const fn options(&self) -> &ShellOptions {
        &self.options
    }

    /// Output channel.
    pub fn channel(&mut self) -> &mut dyn TextChannel {
        &mut *self.channel
    }

    /// Clock used for pacing and input polling.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock
    }

    /// Writes one line of output.
    pub fn print(&mut self, text: &str) {
        self.channel.write_line(text);
    }

    /// Runs `f` against the attached driver, or prints [`NOT_INITIALIZED`].
    ///
    /// Returns `false` when no driver was attached.
    pub fn with_attached<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut dyn DeviceControl, &mut dyn TextChannel),
    {
        match self.device.as_deref_mut() {
            Some(device) => {
                f(device, &mut *self.channel);
                true
            }
            None => {
                self.channel.write_line(NOT_INITIALIZED);
                false
            }
        }
    }

    /// Dispatches `argv` as `module verb [args...]`.
    pub fn dispatch(&mut self, argv: &[&str]) -> DispatchOutcome {
        let Some((&module, rest)) = argv.split_first() else {
            return DispatchOutcome::Empty;
        };

        if !self.registry.has_module(module) {
            self.print(&format!("Unknown module: {module}"));
            let modules = self.registry.modules().join(", ");
            self.print(&format!("Available modules: {modules}"));
            return DispatchOutcome::UnknownModule;
        }

        let Some(&verb) = rest.first() else {
            self.print(&format!("Usage: {module} <command> [args]"));
            self.print(&format!("Type '{module} help' to see available commands."));
            return DispatchOutcome::MissingVerb;
        };

        let Some(handler) = self.registry.find(module, verb).map(|cmd| cmd.handler) else {
            self.print(&format!("Unknown command: {module} {verb}"));
            self.print(&format!("Type '{module} help' to see available commands."));
            return DispatchOutcome::UnknownVerb;
        };

        debug!(module, verb, args = rest.len() - 1, "dispatching command");
        handler(self, rest);
        DispatchOutcome::Handled
    }

    /// Splits `line` on whitespace and dispatches the tokens.
    pub fn execute_line(&mut self, line: &str) -> DispatchOutcome {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        self.dispatch(&tokens)
    }

    /// Blocks until the channel yields a line, polling at the configured
    /// interval. Returns `None` once input is closed.
    ///
    /// There is no timeout: an open channel that never produces a line keeps
    /// the caller waiting.
    pub fn wait_for_line(&mut self) -> Option<String> {
        loop {
            match self.channel.poll_line() {
                LineInput::Line(line) => return Some(line),
                LineInput::Closed => return None,
                LineInput::Pending => self.clock.sleep(self.options.input_poll),
            }
        }
    }

    /// Read-eval loop: prompts, reads a line, and executes it until input
    /// closes or the user types `exit`/`quit`. Returns the number of command
    /// lines executed.
    pub fn run_interactive(&mut self) -> usize {
        let mut executed = 0;
        loop {
            self.channel.write("> ");
            let Some(line) = self.wait_for_line() else {
                self.channel.write_line("");
                break;
            };
            let line = line.trim();
            if is_exit_word(line) {
                break;
            }
            if line.is_empty() {
                continue;
            }
            self.execute_line(line);
            executed += 1;
        }
        executed
    }
}

/// Returns `true` for `exit` or `quit` in any letter case.
#[must_use]
pub fn is_exit_word(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
