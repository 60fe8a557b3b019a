//! Command shell: session state, dispatch and error reporting.
//!
//! # Responsibility
//! - Own the collection store, output channel and script nesting state.
//! - Tokenize command lines, check arity and route to registered handlers.
//! - Convert every command failure into one user-facing line.
//!
//! # Invariants
//! - No error escapes a single command except output I/O failures.
//! - Arity is checked before a handler runs; mismatches never touch the store.
//! - Handlers validate all input before mutating the store.
//! - Only `exit` yields `Flow::Exit`; it propagates out of nested scripts.

mod commands;
pub mod registry;

pub use registry::{CommandFn, CommandRegistry, CommandSpec, RegistryError};

use crate::builder::BuildError;
use crate::input::{ExecMode, InputError, InputSource, ScriptError, ScriptReadError};
use crate::model::person::PersonKey;
use crate::persist::{load_collection, PersistError};
use crate::store::{CollectionStore, StoreError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Deepest allowed `script` nesting.
pub const MAX_SCRIPT_DEPTH: usize = 32;

/// Whether the read loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub type CommandResult = Result<Flow, CommandError>;

/// Every failure a command can report.
#[derive(Debug)]
pub enum CommandError {
    /// Wrong token count for the command.
    Arity {
        command: &'static str,
        usage: &'static str,
        expected: usize,
        given: usize,
    },
    /// Key argument is not an integer.
    InvalidKey(String),
    UnknownKey(PersonKey),
    /// No collection is loaded.
    Uninitialized,
    EmptyCollection,
    UnknownCommand(String),
    ScriptNotFound(PathBuf),
    /// Script path exists but cannot be opened as a file.
    ScriptOpen(ScriptError),
    ScriptRead(ScriptReadError),
    ScriptRecursion(PathBuf),
    /// Input ended while a record was being entered.
    InputExhausted,
    Build(BuildError),
    Persist(PersistError),
    Io(std::io::Error),
}

impl CommandError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arity { .. } => "arity",
            Self::InvalidKey(_) => "invalid_key",
            Self::UnknownKey(_) => "unknown_key",
            Self::Uninitialized => "uninitialized_store",
            Self::EmptyCollection => "empty_collection",
            Self::UnknownCommand(_) => "unknown_command",
            Self::ScriptNotFound(_) => "script_not_found",
            Self::ScriptOpen(_) => "script_open",
            Self::ScriptRead(_) => "script_read",
            Self::ScriptRecursion(_) => "script_recursion",
            Self::InputExhausted => "input_exhausted",
            Self::Build(_) => "build",
            Self::Persist(_) => "persist",
            Self::Io(_) => "io",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arity {
                command,
                usage,
                expected,
                given,
            } => {
                if given < expected {
                    write!(f, "`{command}` is missing an argument. Usage: {usage}")
                } else if *expected == 1 {
                    write!(f, "`{command}` takes no arguments.")
                } else {
                    write!(f, "Too many arguments. Usage: {usage}")
                }
            }
            Self::InvalidKey(value) => write!(f, "Key must be an integer, got `{value}`."),
            Self::UnknownKey(key) => write!(f, "No element with key {key}."),
            Self::Uninitialized => write!(f, "The collection is not initialized."),
            Self::EmptyCollection => write!(f, "The collection is empty."),
            Self::UnknownCommand(name) => write!(
                f,
                "Unknown command `{name}`. Type `help` to list available commands."
            ),
            Self::ScriptNotFound(path) => {
                write!(f, "Script file not found: {}", path.display())
            }
            Self::ScriptOpen(err) => write!(f, "Cannot open script: {err}."),
            Self::ScriptRead(err) => write!(f, "Script error: {err}."),
            Self::ScriptRecursion(path) => write!(
                f,
                "Recursive script call to {} rejected.",
                path.display()
            ),
            Self::InputExhausted => write!(f, "Input ended; the command was cancelled."),
            Self::Build(err) => write!(f, "Cannot build element: {err}."),
            Self::Persist(err) => write!(f, "Collection file error: {err}."),
            Self::Io(err) => write!(f, "I/O error: {err}."),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ScriptOpen(err) => Some(err),
            Self::ScriptRead(err) => Some(err),
            Self::Build(err) => Some(err),
            Self::Persist(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InputError> for CommandError {
    fn from(value: InputError) -> Self {
        match value {
            InputError::Exhausted => Self::InputExhausted,
            InputError::Io(err) => Self::Io(err),
            InputError::Script(err) => Self::ScriptRead(err),
        }
    }
}

impl From<ScriptError> for CommandError {
    fn from(value: ScriptError) -> Self {
        match value {
            ScriptError::NotFound(path) => Self::ScriptNotFound(path),
            other => Self::ScriptOpen(other),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(key) => Self::UnknownKey(key),
        }
    }
}

impl From<BuildError> for CommandError {
    fn from(value: BuildError) -> Self {
        Self::Build(value)
    }
}

impl From<PersistError> for CommandError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// One shell session over a collection file.
pub struct Session<W: Write> {
    store: Option<CollectionStore>,
    collection_path: PathBuf,
    active_script: Option<PathBuf>,
    script_depth: usize,
    registry: CommandRegistry<W>,
    out: W,
}

impl<W: Write> Session<W> {
    /// Creates a session over an already built store.
    pub fn new(store: CollectionStore, collection_path: impl Into<PathBuf>, out: W) -> Self {
        Self::with_store(Some(store), collection_path, out)
    }

    /// Creates a session with no collection; store commands report it.
    pub fn uninitialized(collection_path: impl Into<PathBuf>, out: W) -> Self {
        Self::with_store(None, collection_path, out)
    }

    /// Loads the collection file and reports the outcome on `out`.
    ///
    /// A missing file starts an empty collection. An unreadable file leaves
    /// the session uninitialized so that `save` cannot overwrite it.
    pub fn open(collection_path: impl Into<PathBuf>, mut out: W) -> std::io::Result<Self> {
        let collection_path = collection_path.into();
        let store = match load_collection(&collection_path) {
            Ok(entries) => {
                writeln!(
                    out,
                    "Loaded {} element(s) from {}.",
                    entries.len(),
                    collection_path.display()
                )?;
                Some(CollectionStore::with_entries(entries))
            }
            Err(PersistError::NotFound(path)) => {
                writeln!(
                    out,
                    "Collection file {} not found; starting with an empty collection.",
                    path.display()
                )?;
                Some(CollectionStore::new())
            }
            Err(err) => {
                writeln!(out, "Failed to read the collection: {err}")?;
                None
            }
        };
        Ok(Self::with_store(store, collection_path, out))
    }

    fn with_store(
        store: Option<CollectionStore>,
        collection_path: impl Into<PathBuf>,
        out: W,
    ) -> Self {
        Self {
            store,
            collection_path: collection_path.into(),
            active_script: None,
            script_depth: 0,
            registry: CommandRegistry::with_builtin(),
            out,
        }
    }

    pub fn store(&self) -> Option<&CollectionStore> {
        self.store.as_ref()
    }

    pub fn collection_path(&self) -> &Path {
        &self.collection_path
    }

    pub fn registry(&self) -> &CommandRegistry<W> {
        &self.registry
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads and executes lines until input ends or `exit` runs.
    ///
    /// Undecodable script lines are reported and skipped.
    ///
    /// # Errors
    /// - Only failures of the source itself or of the output channel.
    pub fn run(&mut self, source: &mut dyn InputSource) -> CommandResult {
        loop {
            let line = match source.next_command() {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(Flow::Continue),
                Err(InputError::Script(err @ ScriptReadError::InvalidText { .. })) => {
                    self.report(source.mode(), &CommandError::ScriptRead(err))?;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if self.execute_line(source, &line)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
    }

    /// Executes one command line and reports any failure.
    pub fn execute_line(
        &mut self,
        source: &mut dyn InputSource,
        line: &str,
    ) -> std::io::Result<Flow> {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let Some(name) = tokens.first().copied() else {
            return Ok(Flow::Continue);
        };

        let mode = source.mode();
        match self.dispatch(source, &tokens) {
            Ok(flow) => {
                debug!("event=command_dispatch module=shell status=ok command={name} mode={mode:?}");
                Ok(flow)
            }
            Err(CommandError::Io(err)) => Err(err),
            Err(err) => {
                warn!(
                    "event=command_dispatch module=shell status=error command={name} mode={mode:?} error_code={}",
                    err.code()
                );
                self.report(mode, &err)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, source: &mut dyn InputSource, tokens: &[&str]) -> CommandResult {
        let name = tokens.first().copied().unwrap_or_default();
        let Some(spec) = self.registry.get(name).copied() else {
            return Err(CommandError::UnknownCommand(name.to_string()));
        };
        if tokens.len() != spec.arity {
            return Err(CommandError::Arity {
                command: spec.name,
                usage: spec.usage,
                expected: spec.arity,
                given: tokens.len(),
            });
        }
        (spec.run)(self, source, tokens)
    }

    fn report(&mut self, mode: ExecMode, err: &CommandError) -> std::io::Result<()> {
        match (mode, err) {
            (ExecMode::Script, CommandError::UnknownCommand(name)) => {
                writeln!(self.out, "Skipping unknown command `{name}`.")
            }
            (ExecMode::Script, CommandError::ScriptRead(_)) => {
                writeln!(self.out, "{err} Skipping command.")
            }
            _ => writeln!(self.out, "{err}"),
        }
    }
}
