//! Command line and field value sources.
//!
//! # Responsibility
//! - Define the capability set shared by interactive and script input.
//! - Read one full record through a source, slot by slot.
//!
//! # Invariants
//! - Interactive sources retry invalid fields until input ends.
//! - Script sources fail the current field immediately, without retry.
//! - Location slots after `location_x` are skipped when it is `skip`.
//!
//! # See also
//! - `crate::validate` for per-field rules.

pub mod interactive;
pub mod script;

pub use interactive::InteractiveSource;
pub use script::{ScriptError, ScriptSource};

use crate::builder::{FieldSlot, RecordFields, FIELD_SLOTS, LOCATION_X_SLOT};
use crate::model::person::{EyeColor, HairColor};
use crate::validate::{FieldRejection, SKIP_LITERAL};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{ErrorKind, Write};

/// How the current command line was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Interactive,
    Script,
}

/// Field read failure inside a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptReadError {
    /// The line holding a field value was rejected.
    Malformed {
        line: usize,
        rejection: FieldRejection,
    },
    /// The line at `line` is not valid UTF-8; the line is consumed.
    InvalidText { line: usize },
    /// The file could not be read past `line`.
    Unreadable { line: usize, kind: ErrorKind },
    /// The script ended while a field value was expected.
    UnexpectedEof,
}

impl Display for ScriptReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { line, rejection } => {
                write!(f, "cannot read element at line {line}: {rejection}")
            }
            Self::InvalidText { line } => write!(f, "line {line} is not valid UTF-8 text"),
            Self::Unreadable { line, kind } => {
                write!(f, "cannot read the script after line {line}: {kind}")
            }
            Self::UnexpectedEof => write!(f, "script ended before the element was complete"),
        }
    }
}

impl Error for ScriptReadError {}

/// Errors surfaced while pulling input.
#[derive(Debug)]
pub enum InputError {
    /// Interactive input ended before a valid value was given.
    Exhausted,
    Io(std::io::Error),
    Script(ScriptReadError),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted => write!(f, "input ended before the element was complete"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Script(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Script(err) => Some(err),
            Self::Exhausted => None,
        }
    }
}

impl From<std::io::Error> for InputError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ScriptReadError> for InputError {
    fn from(value: ScriptReadError) -> Self {
        Self::Script(value)
    }
}

/// Source of command lines and validated field values.
///
/// Resources held by a source are released when it is dropped.
pub trait InputSource {
    fn mode(&self) -> ExecMode;

    /// Returns the next raw line, or `None` once input is exhausted.
    fn next_command(&mut self) -> Result<Option<String>, InputError>;

    /// Reads one accepted value for `slot`; `None` means `skip`.
    fn read_field(
        &mut self,
        slot: &FieldSlot,
        out: &mut dyn Write,
    ) -> Result<Option<String>, InputError>;

    /// Prints guidance between fields. Silent unless interactive.
    fn announce(&mut self, out: &mut dyn Write, text: &str) -> std::io::Result<()> {
        if self.mode() == ExecMode::Interactive {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }
}

/// Reads all record slots through `source` in input order.
///
/// # Errors
/// - Propagates the first source failure; nothing is returned partially.
pub fn read_record(
    source: &mut dyn InputSource,
    out: &mut dyn Write,
) -> Result<RecordFields, InputError> {
    let mut fields: RecordFields = Default::default();

    fields[0] = source.read_field(&FIELD_SLOTS[0], out)?;
    source.announce(out, "Enter coordinates")?;
    fields[1] = source.read_field(&FIELD_SLOTS[1], out)?;
    fields[2] = source.read_field(&FIELD_SLOTS[2], out)?;
    source.announce(out, "Creation date generated.")?;
    fields[3] = source.read_field(&FIELD_SLOTS[3], out)?;
    fields[4] = source.read_field(&FIELD_SLOTS[4], out)?;
    source.announce(
        out,
        &format!(
            "Choose eye color from {} or '{SKIP_LITERAL}' to leave it blank.",
            value_list(EyeColor::ALL.iter().map(|color| color.as_str()))
        ),
    )?;
    fields[5] = source.read_field(&FIELD_SLOTS[5], out)?;
    source.announce(
        out,
        &format!(
            "Choose hair color from {} or '{SKIP_LITERAL}' to leave it blank.",
            value_list(HairColor::ALL.iter().map(|color| color.as_str()))
        ),
    )?;
    fields[6] = source.read_field(&FIELD_SLOTS[6], out)?;
    source.announce(
        out,
        &format!("Enter location or '{SKIP_LITERAL}' to leave it blank."),
    )?;
    fields[LOCATION_X_SLOT] = source.read_field(&FIELD_SLOTS[LOCATION_X_SLOT], out)?;

    if fields[LOCATION_X_SLOT].is_some() {
        for (slot, value) in FIELD_SLOTS
            .iter()
            .zip(fields.iter_mut())
            .skip(LOCATION_X_SLOT + 1)
        {
            *value = source.read_field(slot, out)?;
        }
    }

    Ok(fields)
}

fn value_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|value| format!("[{value}]"))
        .collect::<Vec<_>>()
        .join(" ")
}
