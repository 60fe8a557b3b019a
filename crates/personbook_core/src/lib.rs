//! Core of the personbook shell.
//! Owns the person model, its validation rules, the keyed collection and
//! the command shell that drives it.

pub mod builder;
pub mod input;
pub mod logging;
pub mod model;
pub mod persist;
pub mod shell;
pub mod store;
pub mod validate;

pub use builder::{build_person, build_person_at, BuildError, FieldSlot, RecordFields, FIELD_SLOTS};
pub use input::{
    read_record, ExecMode, InputError, InputSource, InteractiveSource, ScriptError,
    ScriptReadError, ScriptSource,
};
pub use logging::{
    default_log_dir, default_log_level, init_logging, logging_status, LogConfig, LoggingError,
};
pub use model::person::{
    Coordinates, EyeColor, HairColor, Location, Person, PersonKey, PersonValidationError,
};
pub use persist::{
    decode_collection, encode_collection, load_collection, save_collection, PersistError,
    DEFAULT_COLLECTION_FILE,
};
pub use shell::{CommandError, CommandRegistry, CommandResult, CommandSpec, Flow, Session};
pub use store::{CollectionStore, KeyDirection, StoreError};
pub use validate::{validate, validate_line, FieldKind, FieldRejection, SKIP_LITERAL};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
