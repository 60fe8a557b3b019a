//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical `Person` record and its nested sub-records.
//! - Provide the lexicographic total order over all record fields.
//! - Provide the text rendering used by `show` and `sort_print`.
//!
//! # Invariants
//! - `name` is non-empty and made of ASCII letters only.
//! - `height > 0` and `coordinates.y > -273`.
//! - Float fields are finite; comparisons use `f32::total_cmp`.

use chrono::{Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid name regex"));

/// Lowest value `Coordinates::y` may not reach.
pub const MIN_COORDINATE_Y_EXCLUSIVE: i64 = -273;

/// Integer key identifying one record inside the collection.
pub type PersonKey = i32;

/// Returns whether `value` is an acceptable person or location name.
pub fn is_valid_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

/// Eye color value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EyeColor {
    Green,
    Red,
    Yellow,
    White,
}

impl EyeColor {
    /// All values in declaration order.
    pub const ALL: [EyeColor; 4] = [Self::Green, Self::Red, Self::Yellow, Self::White];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::White => "WHITE",
        }
    }

    /// Parses the exact upper-case name; no case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

impl Display for EyeColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hair color value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HairColor {
    Green,
    Red,
    Black,
    Yellow,
}

impl HairColor {
    /// All values in declaration order.
    pub const ALL: [HairColor; 4] = [Self::Green, Self::Red, Self::Black, Self::Yellow];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Red => "RED",
            Self::Black => "BLACK",
            Self::Yellow => "YELLOW",
        }
    }

    /// Parses the exact upper-case name; no case folding.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

impl Display for HairColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required position sub-record.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub x: f32,
    /// Must be greater than `MIN_COORDINATE_Y_EXCLUSIVE`.
    pub y: i64,
}

impl Coordinates {
    pub fn new(x: f32, y: i64) -> Self {
        Self { x, y }
    }
}

impl Ord for Coordinates {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.cmp(&other.y))
    }
}

impl PartialOrd for Coordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coordinates {}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x = {}, y = {})", self.x, self.y)
    }
}

/// Optional named place sub-record.
#[derive(Debug, Clone)]
pub struct Location {
    pub x: i64,
    pub y: f32,
    pub z: i32,
    pub name: String,
}

impl Location {
    pub fn new(x: i64, y: f32, z: i32, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            name: name.into(),
        }
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.cmp(&other.z))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Location {}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x = {}, y = {}, z = {}, name = {})",
            self.x, self.y, self.z, self.name
        )
    }
}

/// Canonical collection record.
#[derive(Debug, Clone)]
pub struct Person {
    pub name: String,
    pub coordinates: Coordinates,
    /// Local wall-clock time the record was built.
    pub creation_date: NaiveDateTime,
    pub height: i32,
    pub birthday: Option<NaiveDate>,
    pub eye_color: Option<EyeColor>,
    pub hair_color: Option<HairColor>,
    pub location: Option<Location>,
}

impl Person {
    /// Creates a record stamped with the current local time.
    ///
    /// Optional fields start as `None`.
    pub fn new(name: impl Into<String>, coordinates: Coordinates, height: i32) -> Self {
        Self::with_creation_date(name, coordinates, height, Local::now().naive_local())
    }

    /// Creates a record with a caller-provided creation time.
    ///
    /// Used by load paths where the timestamp already exists on disk.
    pub fn with_creation_date(
        name: impl Into<String>,
        coordinates: Coordinates,
        height: i32,
        creation_date: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            coordinates,
            creation_date,
            height,
            birthday: None,
            eye_color: None,
            hair_color: None,
            location: None,
        }
    }

    /// Checks field invariants that the type system does not carry.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if !is_valid_name(&self.name) {
            return Err(PersonValidationError::InvalidName(self.name.clone()));
        }
        if !self.coordinates.x.is_finite() {
            return Err(PersonValidationError::NonFiniteCoordinate);
        }
        if self.coordinates.y <= MIN_COORDINATE_Y_EXCLUSIVE {
            return Err(PersonValidationError::CoordinateYOutOfRange(
                self.coordinates.y,
            ));
        }
        if self.height <= 0 {
            return Err(PersonValidationError::NonPositiveHeight(self.height));
        }
        if let Some(location) = &self.location {
            if !location.y.is_finite() {
                return Err(PersonValidationError::NonFiniteCoordinate);
            }
            if !is_valid_name(&location.name) {
                return Err(PersonValidationError::InvalidName(location.name.clone()));
            }
        }
        Ok(())
    }
}

impl Ord for Person {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.coordinates.cmp(&other.coordinates))
            .then_with(|| self.creation_date.cmp(&other.creation_date))
            .then_with(|| self.height.cmp(&other.height))
            .then_with(|| self.birthday.cmp(&other.birthday))
            .then_with(|| self.eye_color.cmp(&other.eye_color))
            .then_with(|| self.hair_color.cmp(&other.hair_color))
            .then_with(|| self.location.cmp(&other.location))
    }
}

impl PartialOrd for Person {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Person {}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "name = {}; coordinates = {}; creation_date = {}; height = {}; birthday = ",
            self.name,
            self.coordinates,
            self.creation_date.format("%Y-%m-%d %H:%M:%S"),
            self.height
        )?;
        write_optional(f, self.birthday.as_ref())?;
        f.write_str("; eye_color = ")?;
        write_optional(f, self.eye_color.as_ref())?;
        f.write_str("; hair_color = ")?;
        write_optional(f, self.hair_color.as_ref())?;
        f.write_str("; location = ")?;
        write_optional(f, self.location.as_ref())
    }
}

fn write_optional<T: Display>(f: &mut Formatter<'_>, value: Option<&T>) -> std::fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => f.write_str("none"),
    }
}

/// Invariant violations detected by `Person::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    InvalidName(String),
    NonFiniteCoordinate,
    CoordinateYOutOfRange(i64),
    NonPositiveHeight(i32),
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => {
                write!(f, "name `{value}` must contain latin letters only")
            }
            Self::NonFiniteCoordinate => write!(f, "coordinate values must be finite"),
            Self::CoordinateYOutOfRange(value) => write!(
                f,
                "coordinate y ({value}) must be > {MIN_COORDINATE_Y_EXCLUSIVE}"
            ),
            Self::NonPositiveHeight(value) => write!(f, "height ({value}) must be > 0"),
        }
    }
}

impl Error for PersonValidationError {}
