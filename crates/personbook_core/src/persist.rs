//! XML collection file reader and writer.
//!
//! # Responsibility
//! - Map the collection to and from the `<collection>` XML document.
//! - Reject invalid persisted records instead of masking them.
//!
//! # Invariants
//! - Comma decimal separators are accepted on read and never written.
//! - Loaded records pass `Person::validate()`.
//! - Missing files are reported as `NotFound`, distinct from I/O errors.

use crate::model::person::{
    Coordinates, EyeColor, HairColor, Location, Person, PersonKey, PersonValidationError,
};
use crate::store::CollectionStore;
use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{error, info};
use quick_xml::errors::serialize::{DeError, SeError};
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

/// Collection file used when none is given on the command line.
pub const DEFAULT_COLLECTION_FILE: &str = "collection.xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_TAG: &str = "collection";
const INDENT_WIDTH: usize = 4;
const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while reading or writing the collection file.
#[derive(Debug)]
pub enum PersistError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Parse(DeError),
    Serialize(SeError),
    InvalidData(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "collection file not found: {}", path.display()),
            Self::Io(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "malformed collection XML: {err}"),
            Self::Serialize(err) => write!(f, "failed to encode collection XML: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DeError> for PersistError {
    fn from(value: DeError) -> Self {
        Self::Parse(value)
    }
}

impl From<SeError> for PersistError {
    fn from(value: SeError) -> Self {
        Self::Serialize(value)
    }
}

impl From<PersonValidationError> for PersistError {
    fn from(value: PersonValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlCollection {
    #[serde(rename = "person", default)]
    people: Vec<XmlPerson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlPerson {
    id: String,
    name: String,
    coordinates: XmlCoordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_date: Option<String>,
    height: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eye_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hair_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<XmlLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlCoordinates {
    x: String,
    y: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlLocation {
    x: String,
    y: String,
    z: String,
    name: String,
}

/// Reads a collection file into a key → record map.
///
/// # Errors
/// - `NotFound` when the file does not exist.
/// - `Parse` when the document is not a valid collection.
/// - `InvalidData` when a record value fails conversion or validation.
pub fn load_collection(path: impl AsRef<Path>) -> PersistResult<BTreeMap<PersonKey, Person>> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=collection_load module=persist status=start path={}",
        path.display()
    );

    match read_collection(path) {
        Ok(entries) => {
            info!(
                "event=collection_load module=persist status=ok count={} duration_ms={}",
                entries.len(),
                started_at.elapsed().as_millis()
            );
            Ok(entries)
        }
        Err(err) => {
            error!(
                "event=collection_load module=persist status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Writes the store to `path`, replacing any previous content.
pub fn save_collection(path: impl AsRef<Path>, store: &CollectionStore) -> PersistResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();

    let result = encode_collection(store).and_then(|document| {
        std::fs::write(path, document)?;
        Ok(())
    });
    match &result {
        Ok(()) => info!(
            "event=collection_save module=persist status=ok count={} path={} duration_ms={}",
            store.len(),
            path.display(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=collection_save module=persist status=error path={} duration_ms={} error={}",
            path.display(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

/// Renders the full XML document for a store.
pub fn encode_collection(store: &CollectionStore) -> PersistResult<String> {
    let collection = XmlCollection {
        people: store
            .entries()
            .map(|(key, person)| person_to_xml(key, person))
            .collect(),
    };

    let mut body = String::new();
    let mut serializer = Serializer::with_root(&mut body, Some(ROOT_TAG))?;
    serializer.indent(' ', INDENT_WIDTH);
    collection.serialize(serializer)?;

    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

/// Parses an XML document into a key → record map.
pub fn decode_collection(document: &str) -> PersistResult<BTreeMap<PersonKey, Person>> {
    let collection: XmlCollection = quick_xml::de::from_str(document)?;
    let loaded_at = Local::now().naive_local();

    let mut entries = BTreeMap::new();
    for raw in collection.people {
        let (key, person) = person_from_xml(raw, loaded_at)?;
        person.validate()?;
        entries.insert(key, person);
    }
    Ok(entries)
}

fn read_collection(path: &Path) -> PersistResult<BTreeMap<PersonKey, Person>> {
    let document = match std::fs::read_to_string(path) {
        Ok(document) => document,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(PersistError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    decode_collection(&document)
}

fn person_to_xml(key: PersonKey, person: &Person) -> XmlPerson {
    XmlPerson {
        id: key.to_string(),
        name: person.name.clone(),
        coordinates: XmlCoordinates {
            x: person.coordinates.x.to_string(),
            y: person.coordinates.y.to_string(),
        },
        creation_date: Some(
            person
                .creation_date
                .format(CREATION_DATE_FORMAT)
                .to_string(),
        ),
        height: person.height.to_string(),
        birthday: person.birthday.map(|date| date.to_string()),
        eye_color: person.eye_color.map(|color| color.as_str().to_string()),
        hair_color: person.hair_color.map(|color| color.as_str().to_string()),
        location: person.location.as_ref().map(|location| XmlLocation {
            x: location.x.to_string(),
            y: location.y.to_string(),
            z: location.z.to_string(),
            name: location.name.clone(),
        }),
    }
}

fn person_from_xml(
    raw: XmlPerson,
    loaded_at: NaiveDateTime,
) -> PersistResult<(PersonKey, Person)> {
    let key = parse_number::<PersonKey>(&raw.id, "id")?;
    let coordinates = Coordinates::new(
        parse_decimal(&raw.coordinates.x, "coordinates.x")?,
        parse_number::<i64>(&raw.coordinates.y, "coordinates.y")?,
    );
    let creation_date = match raw.creation_date.as_deref() {
        Some(value) => parse_creation_date(value)?,
        None => loaded_at,
    };
    let height = parse_number::<i32>(&raw.height, "height")?;

    let mut person = Person::with_creation_date(raw.name.trim(), coordinates, height, creation_date);
    person.birthday = raw
        .birthday
        .as_deref()
        .map(|value| parse_number::<NaiveDate>(value, "birthday"))
        .transpose()?;
    person.eye_color = raw
        .eye_color
        .as_deref()
        .map(|value| {
            EyeColor::parse(value.trim()).ok_or_else(|| invalid("eyeColor", value))
        })
        .transpose()?;
    person.hair_color = raw
        .hair_color
        .as_deref()
        .map(|value| {
            HairColor::parse(value.trim()).ok_or_else(|| invalid("hairColor", value))
        })
        .transpose()?;
    person.location = raw
        .location
        .map(|location| -> PersistResult<Location> {
            Ok(Location::new(
                parse_number::<i64>(&location.x, "location.x")?,
                parse_decimal(&location.y, "location.y")?,
                parse_number::<i32>(&location.z, "location.z")?,
                location.name.trim(),
            ))
        })
        .transpose()?;

    Ok((key, person))
}

fn parse_number<T: FromStr>(value: &str, field: &str) -> PersistResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| invalid(field, value))
}

// Files written with a comma decimal locale must still load.
fn parse_decimal(value: &str, field: &str) -> PersistResult<f32> {
    let normalized = value.trim().replace(',', ".");
    let parsed = normalized
        .parse::<f32>()
        .map_err(|_| invalid(field, value))?;
    if !parsed.is_finite() {
        return Err(invalid(field, value));
    }
    Ok(parsed)
}

fn parse_creation_date(value: &str) -> PersistResult<NaiveDateTime> {
    let trimmed = value.trim();
    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| invalid("creationDate", value))
}

fn invalid(field: &str, value: &str) -> PersistError {
    PersistError::InvalidData(format!("invalid {field} value `{}`", value.trim()))
}
