//! Assembles validated field values into a `Person`.
//!
//! # Responsibility
//! - Define the ordered field slots read for one record.
//! - Convert accepted raw values into typed record fields.
//!
//! # Invariants
//! - Location slots are only read when `location_x` is present.
//! - The creation timestamp comes from the caller, never from input.

use crate::model::person::{Coordinates, EyeColor, HairColor, Location, Person};
use crate::validate::FieldKind;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of field slots in one record input.
pub const FIELD_COUNT: usize = 11;

/// Slot index of the location x value; decides whether the rest is read.
pub const LOCATION_X_SLOT: usize = 7;

/// One record field slot in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub kind: FieldKind,
    /// Short label shown in interactive prompts.
    pub prompt: &'static str,
}

/// Field slots in the exact order they are read.
pub const FIELD_SLOTS: [FieldSlot; FIELD_COUNT] = [
    FieldSlot {
        kind: FieldKind::Name,
        prompt: "Name: ",
    },
    FieldSlot {
        kind: FieldKind::Decimal,
        prompt: "X: ",
    },
    FieldSlot {
        kind: FieldKind::CoordinateY,
        prompt: "Y (integer > -273): ",
    },
    FieldSlot {
        kind: FieldKind::Height,
        prompt: "Height (integer > 0): ",
    },
    FieldSlot {
        kind: FieldKind::Date,
        prompt: "Birthday (YYYY-MM-DD): ",
    },
    FieldSlot {
        kind: FieldKind::EyeColor,
        prompt: "Eye color: ",
    },
    FieldSlot {
        kind: FieldKind::HairColor,
        prompt: "Hair color: ",
    },
    FieldSlot {
        kind: FieldKind::LocationX,
        prompt: "Location X (integer): ",
    },
    FieldSlot {
        kind: FieldKind::Decimal,
        prompt: "Location Y: ",
    },
    FieldSlot {
        kind: FieldKind::LocationZ,
        prompt: "Location Z (integer): ",
    },
    FieldSlot {
        kind: FieldKind::LocationName,
        prompt: "Location name: ",
    },
];

/// Accepted raw values, one per slot; `None` means skipped or not read.
pub type RecordFields = [Option<String>; FIELD_COUNT];

/// Conversion failures for a field array that skipped validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    MissingField(&'static str),
    InvalidField { field: &'static str, value: String },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is missing"),
            Self::InvalidField { field, value } => {
                write!(f, "field `{field}` has invalid value `{value}`")
            }
        }
    }
}

impl Error for BuildError {}

/// Builds a record stamped with the current local time.
pub fn build_person(fields: &RecordFields) -> Result<Person, BuildError> {
    build_person_at(fields, Local::now().naive_local())
}

/// Builds a record with an explicit creation timestamp.
///
/// # Errors
/// - `MissingField` when a required slot is `None`.
/// - `InvalidField` when a slot does not parse as its type.
pub fn build_person_at(
    fields: &RecordFields,
    creation_date: NaiveDateTime,
) -> Result<Person, BuildError> {
    let name = required(fields, 0, "name")?;
    let x = parse_required::<f32>(fields, 1, "coordinates.x")?;
    let y = parse_required::<i64>(fields, 2, "coordinates.y")?;
    let height = parse_required::<i32>(fields, 3, "height")?;

    let mut person =
        Person::with_creation_date(name, Coordinates::new(x, y), height, creation_date);
    person.birthday = parse_optional::<NaiveDate>(fields, 4, "birthday")?;
    person.eye_color = parse_color(fields, 5, "eye_color", EyeColor::parse)?;
    person.hair_color = parse_color(fields, 6, "hair_color", HairColor::parse)?;

    if let Some(location_x) = parse_optional::<i64>(fields, LOCATION_X_SLOT, "location.x")? {
        person.location = Some(Location::new(
            location_x,
            parse_required::<f32>(fields, 8, "location.y")?,
            parse_required::<i32>(fields, 9, "location.z")?,
            required(fields, 10, "location.name")?,
        ));
    }

    Ok(person)
}

fn required<'a>(
    fields: &'a RecordFields,
    slot: usize,
    field: &'static str,
) -> Result<&'a str, BuildError> {
    fields[slot]
        .as_deref()
        .ok_or(BuildError::MissingField(field))
}

fn parse_required<T: FromStr>(
    fields: &RecordFields,
    slot: usize,
    field: &'static str,
) -> Result<T, BuildError> {
    let raw = required(fields, slot, field)?;
    raw.parse::<T>().map_err(|_| BuildError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

fn parse_optional<T: FromStr>(
    fields: &RecordFields,
    slot: usize,
    field: &'static str,
) -> Result<Option<T>, BuildError> {
    match fields[slot].as_deref() {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| BuildError::InvalidField {
                field,
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_color<T>(
    fields: &RecordFields,
    slot: usize,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, BuildError> {
    match fields[slot].as_deref() {
        Some(raw) => parse(raw).map(Some).ok_or_else(|| BuildError::InvalidField {
            field,
            value: raw.to_string(),
        }),
        None => Ok(None),
    }
}
