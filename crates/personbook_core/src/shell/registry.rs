//! Command name → handler registry.

use super::commands;
use super::{CommandResult, Session};
use crate::input::InputSource;
use log::warn;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Handler entry point. `tokens[0]` is the command name.
pub type CommandFn<W> = fn(&mut Session<W>, &mut dyn InputSource, &[&str]) -> CommandResult;

/// One registered command.
pub struct CommandSpec<W: Write> {
    pub name: &'static str,
    /// Usage line shown by `help`, e.g. `update [key]`.
    pub usage: &'static str,
    pub description: &'static str,
    /// Required token count, command name included.
    pub arity: usize,
    pub run: CommandFn<W>,
}

impl<W: Write> Clone for CommandSpec<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: Write> Copy for CommandSpec<W> {}

impl<W: Write> CommandSpec<W> {
    pub fn new(
        name: &'static str,
        usage: &'static str,
        description: &'static str,
        arity: usize,
        run: CommandFn<W>,
    ) -> Self {
        Self {
            name,
            usage,
            description,
            arity,
            run,
        }
    }

    /// Line printed by `help`.
    pub fn help_line(&self) -> String {
        format!("{}: {}", self.usage, self.description)
    }
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    DuplicateName(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "command name is invalid: `{value}`"),
            Self::DuplicateName(value) => write!(f, "command already registered: `{value}`"),
        }
    }
}

impl Error for RegistryError {}

/// Fixed set of commands keyed by exact, case-sensitive name.
pub struct CommandRegistry<W: Write> {
    commands: BTreeMap<&'static str, CommandSpec<W>>,
}

impl<W: Write> Default for CommandRegistry<W> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<W: Write> CommandRegistry<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every shell command.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for spec in builtin_commands::<W>() {
            if let Err(err) = registry.register(spec) {
                warn!("event=command_register module=shell status=error error={err}");
            }
        }
        registry
    }

    /// Registers one command.
    pub fn register(&mut self, spec: CommandSpec<W>) -> Result<(), RegistryError> {
        if !is_valid_command_name(spec.name) {
            return Err(RegistryError::InvalidName(spec.name.to_string()));
        }
        if self.commands.contains_key(spec.name) {
            return Err(RegistryError::DuplicateName(spec.name.to_string()));
        }
        self.commands.insert(spec.name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec<W>> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec<W>> + '_ {
        self.commands.values()
    }
}

fn is_valid_command_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '_')
}

fn builtin_commands<W: Write>() -> [CommandSpec<W>; 16] {
    [
        CommandSpec::new(
            "help",
            "help",
            "show help for available commands",
            1,
            commands::help,
        ),
        CommandSpec::new(
            "info",
            "info",
            "show collection type, creation date and size",
            1,
            commands::info,
        ),
        CommandSpec::new(
            "show",
            "show",
            "print every element of the collection",
            1,
            commands::show,
        ),
        CommandSpec::new(
            "insert",
            "insert",
            "add a new element under a generated key",
            1,
            commands::insert,
        ),
        CommandSpec::new(
            "update",
            "update [key]",
            "replace the element stored under key",
            2,
            commands::update,
        ),
        CommandSpec::new(
            "remove",
            "remove [key]",
            "remove the element stored under key",
            2,
            commands::remove,
        ),
        CommandSpec::new(
            "clear",
            "clear",
            "remove every element",
            1,
            commands::clear,
        ),
        CommandSpec::new(
            "save",
            "save",
            "write the collection to its file",
            1,
            commands::save,
        ),
        CommandSpec::new(
            "script",
            "script [file_name]",
            "run commands from a script file",
            2,
            commands::script,
        ),
        CommandSpec::new(
            "exit",
            "exit",
            "quit without saving",
            1,
            commands::exit,
        ),
        CommandSpec::new(
            "replace_if_greater",
            "replace_if_greater [key]",
            "replace the element under key if the new one is greater",
            2,
            commands::replace_if_greater,
        ),
        CommandSpec::new(
            "remove_greater_key",
            "remove_greater_key [key]",
            "remove every element whose key is greater than key",
            2,
            commands::remove_greater_key,
        ),
        CommandSpec::new(
            "remove_lower_key",
            "remove_lower_key [key]",
            "remove every element whose key is lower than key",
            2,
            commands::remove_lower_key,
        ),
        CommandSpec::new(
            "sort_print",
            "sort_print",
            "print elements in ascending key order",
            1,
            commands::sort_print,
        ),
        CommandSpec::new(
            "sort_hair",
            "sort_hair",
            "print hair colors in sorted order",
            1,
            commands::sort_hair,
        ),
        CommandSpec::new(
            "unique_hair",
            "unique_hair",
            "print hair colors that occur exactly once",
            1,
            commands::unique_hair,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        builtin_commands, is_valid_command_name, CommandRegistry, CommandSpec, RegistryError,
    };
    use crate::shell::commands;

    #[test]
    fn builtin_registry_has_every_command() {
        let registry = CommandRegistry::<Vec<u8>>::with_builtin();
        assert_eq!(registry.len(), 16);
        for name in [
            "insert",
            "update",
            "remove",
            "remove_greater_key",
            "remove_lower_key",
            "replace_if_greater",
            "sort_print",
            "sort_hair",
            "unique_hair",
            "show",
            "info",
            "clear",
            "save",
            "script",
            "help",
            "exit",
        ] {
            assert!(registry.get(name).is_some(), "missing command {name}");
        }
        assert!(registry.get("Show").is_none());
    }

    #[test]
    fn builtin_names_pass_registration_rules() {
        for spec in builtin_commands::<Vec<u8>>() {
            assert!(is_valid_command_name(spec.name), "invalid name {}", spec.name);
        }
        let mut registry = CommandRegistry::<Vec<u8>>::with_builtin();
        let again = registry.register(CommandSpec::new("help", "help", "", 1, commands::help));
        assert!(matches!(again, Err(RegistryError::DuplicateName(_))));
        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn key_commands_take_one_argument() {
        let registry = CommandRegistry::<Vec<u8>>::with_builtin();
        assert_eq!(registry.get("update").map(|spec| spec.arity), Some(2));
        assert_eq!(registry.get("show").map(|spec| spec.arity), Some(1));
    }

    #[test]
    fn rejects_invalid_or_duplicate_names() {
        let mut registry = CommandRegistry::<Vec<u8>>::new();
        let invalid = registry.register(CommandSpec::new("Show All", "", "", 1, commands::show));
        assert!(matches!(invalid, Err(RegistryError::InvalidName(_))));

        registry
            .register(CommandSpec::new("show", "show", "", 1, commands::show))
            .expect("first registration should succeed");
        let duplicate = registry.register(CommandSpec::new("show", "show", "", 1, commands::show));
        assert!(matches!(duplicate, Err(RegistryError::DuplicateName(_))));
    }
}
