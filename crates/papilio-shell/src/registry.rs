//! Command table keyed by `(module, verb)`.

use crate::error::RegistryError;
use crate::shell::CommandShell;

/// Handler invoked for a matched command.
///
/// `args[0]` is the verb; the remaining entries are the command arguments.
pub type Handler = fn(&mut CommandShell<'_>, &[&str]);

/// One registered command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    /// Module namespace, the first token of a command line.
    pub module: String,
    /// Verb, the second token of a command line.
    pub verb: String,
    /// Argument synopsis shown by `help`, e.g. `write <value>`.
    pub usage: String,
    /// One-line description shown by `help`.
    pub help: String,
    /// Function run when the command is dispatched.
    pub handler: Handler,
}

impl CommandDescriptor {
    /// Creates a descriptor whose usage synopsis is just the verb.
    #[must_use]
    pub fn new(module: &str, verb: &str, help: &str, handler: Handler) -> Self {
        Self {
            module: module.to_string(),
            verb: verb.to_string(),
            usage: verb.to_string(),
            help: help.to_string(),
            handler,
        }
    }

    /// Replaces the usage synopsis.
    #[must_use]
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    fn key_is_valid(&self) -> bool {
        let valid = |s: &str| !s.is_empty() && !s.chars().any(char::is_whitespace);
        valid(&self.module) && valid(&self.verb)
    }
}

/// Append-only command table. Registration order is preserved for `help`.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the `(module, verb)` key is
    /// already present and [`RegistryError::InvalidKey`] when either part is
    /// empty or contains whitespace.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if !descriptor.key_is_valid() {
            return Err(RegistryError::InvalidKey {
                module: descriptor.module,
                verb: descriptor.verb,
            });
        }
        if self.find(&descriptor.module, &descriptor.verb).is_some() {
            return Err(RegistryError::Duplicate {
                module: descriptor.module,
                verb: descriptor.verb,
            });
        }
        self.commands.push(descriptor);
        Ok(())
    }

    /// Looks up the command registered under `(module, verb)`.
    #[must_use]
    pub fn find(&self, module: &str, verb: &str) -> Option<&CommandDescriptor> {
        self.commands
            .iter()
            .find(|cmd| cmd.module == module && cmd.verb == verb)
    }

    /// Returns `true` when any command lives in `module`.
    #[must_use]
    pub fn has_module(&self, module: &str) -> bool {
        self.commands.iter().any(|cmd| cmd.module == module)
    }

    /// Commands of `module` in registration order.
    pub fn commands_for<'r>(
        &'r self,
        module: &'r str,
    ) -> impl Iterator<Item = &'r CommandDescriptor> + 'r {
        self.commands.iter().filter(move |cmd| cmd.module == module)
    }

    /// Distinct module names in first-registration order.
    #[must_use]
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = Vec::new();
        for cmd in &self.commands {
            if !modules.contains(&cmd.module.as_str()) {
                modules.push(&cmd.module);
            }
        }
        modules
    }

    /// All commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when no command is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandDescriptor, CommandRegistry};
    use crate::error::RegistryError;
    use crate::shell::CommandShell;

    fn noop(_shell: &mut CommandShell<'_>, _args: &[&str]) {}

    #[test]
    fn duplicate_key_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("template", "status", "a", noop))
            .unwrap();

        let error = registry
            .register(CommandDescriptor::new("template", "status", "b", noop))
            .unwrap_err();

        assert_eq!(
            error,
            RegistryError::Duplicate {
                module: "template".into(),
                verb: "status".into()
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("template", "status").unwrap().help, "a");
    }

    #[test]
    fn same_verb_in_other_module_is_allowed() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new("template", "status", "a", noop))
            .unwrap();
        registry
            .register(CommandDescriptor::new("uart", "status", "b", noop))
            .unwrap();

        assert_eq!(registry.modules(), vec!["template", "uart"]);
        assert_eq!(registry.commands_for("uart").count(), 1);
    }

    #[test]
    fn keys_with_whitespace_are_rejected() {
        let mut registry = CommandRegistry::new();
        let error = registry
            .register(CommandDescriptor::new("tem plate", "status", "a", noop))
            .unwrap_err();
        assert!(matches!(error, RegistryError::InvalidKey { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn usage_defaults_to_verb() {
        let plain = CommandDescriptor::new("template", "read", "Read", noop);
        let with_args = plain.clone().with_usage("read <addr>");
        assert_eq!(plain.usage, "read");
        assert_eq!(with_args.usage, "read <addr>");
    }
}
