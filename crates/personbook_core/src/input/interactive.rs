//! Interactive input over any buffered reader.

use super::{ExecMode, InputError, InputSource};
use crate::builder::FieldSlot;
use crate::validate::validate_line;
use std::io::{BufRead, Write};

/// Line source that re-prompts on invalid field input.
///
/// Command lines and field values come from the same reader, so a record
/// typed after `insert` is consumed in order.
pub struct InteractiveSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> InteractiveSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    // Invalid UTF-8 becomes U+FFFD and then fails validation like any
    // other unknown input.
    fn read_line(&mut self) -> Result<Option<String>, InputError> {
        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes).trim().to_string()))
    }
}

impl<R: BufRead> InputSource for InteractiveSource<R> {
    fn mode(&self) -> ExecMode {
        ExecMode::Interactive
    }

    fn next_command(&mut self) -> Result<Option<String>, InputError> {
        self.read_line()
    }

    fn read_field(
        &mut self,
        slot: &FieldSlot,
        out: &mut dyn Write,
    ) -> Result<Option<String>, InputError> {
        loop {
            write!(out, "{}", slot.prompt)?;
            out.flush()?;

            let Some(line) = self.read_line()? else {
                return Err(InputError::Exhausted);
            };
            match validate_line(&line, slot.kind) {
                Ok(value) => return Ok(value),
                Err(rejection) => writeln!(out, "{rejection}")?,
            }
        }
    }
}
