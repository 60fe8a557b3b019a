//! File-backed script input.

use super::{ExecMode, InputError, InputSource, ScriptReadError};
use crate::builder::FieldSlot;
use crate::validate::validate_line;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Failure to open a script file.
#[derive(Debug)]
pub enum ScriptError {
    NotFound(PathBuf),
    /// The path exists but is a directory or another non-regular file.
    NotAFile(PathBuf),
    Io(std::io::Error),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "script file not found: {}", path.display()),
            Self::NotAFile(path) => write!(f, "{} is not a regular file", path.display()),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::NotFound(_) | Self::NotAFile(_) => None,
        }
    }
}

/// Line source bound to one script file.
///
/// Field values are read from the lines following the command that needs
/// them. Invalid values fail immediately.
pub struct ScriptSource {
    path: PathBuf,
    reader: BufReader<File>,
    line_no: usize,
}

impl ScriptSource {
    /// Opens `path` for reading.
    ///
    /// # Errors
    /// - `NotFound` when the file does not exist.
    /// - `NotAFile` when `path` names a directory or other non-regular file.
    /// - `Io` for any other open failure.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ScriptError::NotFound(path.to_path_buf()),
            _ => ScriptError::Io(err),
        })?;
        if !file.metadata().map_err(ScriptError::Io)?.is_file() {
            return Err(ScriptError::NotAFile(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based number of the last line read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn read_line(&mut self) -> Result<Option<String>, InputError> {
        let mut bytes = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut bytes)
            .map_err(|err| ScriptReadError::Unreadable {
                line: self.line_no,
                kind: err.kind(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let line = String::from_utf8(bytes).map_err(|_| ScriptReadError::InvalidText {
            line: self.line_no,
        })?;
        Ok(Some(line.trim().to_string()))
    }
}

impl InputSource for ScriptSource {
    fn mode(&self) -> ExecMode {
        ExecMode::Script
    }

    fn next_command(&mut self) -> Result<Option<String>, InputError> {
        self.read_line()
    }

    fn read_field(
        &mut self,
        slot: &FieldSlot,
        _out: &mut dyn Write,
    ) -> Result<Option<String>, InputError> {
        let Some(line) = self.read_line()? else {
            return Err(ScriptReadError::UnexpectedEof.into());
        };
        validate_line(&line, slot.kind).map_err(|rejection| {
            ScriptReadError::Malformed {
                line: self.line_no,
                rejection,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ScriptError, ScriptSource};
    use crate::builder::FIELD_SLOTS;
    use crate::input::{InputError, InputSource, ScriptReadError};
    use crate::validate::FieldRejection;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScriptSource::open(dir.path().join("absent.txt"))
            .err()
            .expect("missing script must fail");
        assert!(matches!(err, ScriptError::NotFound(_)));
    }

    #[test]
    fn directory_is_not_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScriptSource::open(dir.path())
            .err()
            .expect("directory must be rejected");
        assert!(matches!(err, ScriptError::NotAFile(_)));
    }

    #[test]
    fn invalid_utf8_line_is_reported_and_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"show\n\xff\xfe\ninfo\n").unwrap();
        let mut source = ScriptSource::open(file.path()).unwrap();

        assert_eq!(source.next_command().unwrap().as_deref(), Some("show"));
        let err = source.next_command().unwrap_err();
        assert!(matches!(
            err,
            InputError::Script(ScriptReadError::InvalidText { line: 2 })
        ));
        assert_eq!(source.next_command().unwrap().as_deref(), Some("info"));
        assert_eq!(source.line_no(), 3);
    }

    #[test]
    fn invalid_field_fails_without_retry() {
        let file = script("0\n170\n");
        let mut source = ScriptSource::open(file.path()).unwrap();
        let mut out = Vec::new();

        let err = source.read_field(&FIELD_SLOTS[3], &mut out).unwrap_err();
        assert!(matches!(
            err,
            InputError::Script(ScriptReadError::Malformed {
                line: 1,
                rejection: FieldRejection::OutOfRange,
            })
        ));
        assert!(out.is_empty());
        assert_eq!(source.next_command().unwrap().as_deref(), Some("170"));
    }

    #[test]
    fn end_of_file_inside_record_is_a_script_error() {
        let file = script("");
        let mut source = ScriptSource::open(file.path()).unwrap();
        let err = source
            .read_field(&FIELD_SLOTS[0], &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            InputError::Script(ScriptReadError::UnexpectedEof)
        ));
    }
}
