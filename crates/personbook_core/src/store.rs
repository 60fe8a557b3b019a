//! In-memory collection store.
//!
//! # Responsibility
//! - Own the key → record mapping and its creation date.
//! - Provide query and mutation primitives used by command handlers.
//!
//! # Invariants
//! - Keys are unique; generated keys never collide with a live key.
//! - Records are inserted whole; the store never holds partial records.
//! - Key iteration is ascending.

use crate::model::person::{HairColor, Person, PersonKey};
use chrono::{Local, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Type tag printed by `info`.
pub const STORE_TYPE_TAG: &str = "BTreeMap<i32, Person>";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(PersonKey),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "no element with key {key}"),
        }
    }
}

impl Error for StoreError {}

/// Which side of a pivot key `remove_where` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    /// Remove keys strictly less than the pivot.
    Lower,
    /// Remove keys strictly greater than the pivot.
    Greater,
}

/// Key → record collection.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    entries: BTreeMap<PersonKey, Person>,
    created_on: NaiveDate,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    /// Creates an empty store dated today.
    pub fn new() -> Self {
        Self::with_entries(BTreeMap::new())
    }

    /// Creates a store from already validated entries.
    pub fn with_entries(entries: BTreeMap<PersonKey, Person>) -> Self {
        Self {
            entries,
            created_on: Local::now().date_naive(),
        }
    }

    /// Inserts a record under a freshly generated key.
    pub fn insert(&mut self, person: Person) -> PersonKey {
        let key = self.generate_key();
        self.entries.insert(key, person);
        debug!("event=store_insert module=store status=ok key={key}");
        key
    }

    /// Overwrites the record at an existing key.
    pub fn update(&mut self, key: PersonKey, person: Person) -> StoreResult<()> {
        let slot = self
            .entries
            .get_mut(&key)
            .ok_or(StoreError::NotFound(key))?;
        *slot = person;
        Ok(())
    }

    pub fn remove(&mut self, key: PersonKey) -> StoreResult<Person> {
        self.entries.remove(&key).ok_or(StoreError::NotFound(key))
    }

    /// Removes every entry strictly below or above `key`.
    ///
    /// Returns the number of removed entries. The pivot itself is kept.
    pub fn remove_where(&mut self, key: PersonKey, direction: KeyDirection) -> usize {
        let before = self.entries.len();
        self.entries.retain(|candidate, _| match direction {
            KeyDirection::Lower => *candidate >= key,
            KeyDirection::Greater => *candidate <= key,
        });
        before - self.entries.len()
    }

    pub fn get(&self, key: PersonKey) -> Option<&Person> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: PersonKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the record at `key` only when `candidate` is strictly greater.
    ///
    /// Returns whether the replacement happened.
    pub fn replace_if_greater(&mut self, key: PersonKey, candidate: Person) -> StoreResult<bool> {
        let existing = self
            .entries
            .get_mut(&key)
            .ok_or(StoreError::NotFound(key))?;
        if candidate > *existing {
            *existing = candidate;
            return Ok(true);
        }
        Ok(false)
    }

    /// Ascending keys; each call starts a new iteration.
    pub fn sorted_keys(&self) -> impl Iterator<Item = PersonKey> + '_ {
        self.entries.keys().copied()
    }

    /// Entries in ascending key order.
    pub fn entries(&self) -> impl Iterator<Item = (PersonKey, &Person)> + '_ {
        self.entries.iter().map(|(key, person)| (*key, person))
    }

    /// Counts per present hair color; records without one are skipped.
    pub fn hair_color_histogram(&self) -> BTreeMap<HairColor, usize> {
        let mut histogram = BTreeMap::new();
        for color in self.entries.values().filter_map(|person| person.hair_color) {
            *histogram.entry(color).or_insert(0) += 1;
        }
        histogram
    }

    /// Every present hair color, sorted by its text form.
    pub fn sorted_hair_colors(&self) -> Vec<HairColor> {
        let mut colors = self
            .entries
            .values()
            .filter_map(|person| person.hair_color)
            .collect::<Vec<_>>();
        colors.sort_by_key(|color| color.as_str());
        colors
    }

    /// Hair colors carried by exactly one record.
    pub fn unique_hair_colors(&self) -> Vec<HairColor> {
        self.hair_color_histogram()
            .into_iter()
            .filter_map(|(color, count)| (count == 1).then_some(color))
            .collect()
    }

    /// Swaps in a whole new mapping, e.g. after a load.
    pub fn replace_all(&mut self, entries: BTreeMap<PersonKey, Person>) {
        self.entries = entries;
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn type_tag(&self) -> &'static str {
        STORE_TYPE_TAG
    }

    fn generate_key(&self) -> PersonKey {
        loop {
            let key = key_from_uuid(Uuid::new_v4());
            if !self.entries.contains_key(&key) {
                return key;
            }
        }
    }
}

/// Folds a random UUID into a non-negative `i32`.
fn key_from_uuid(uuid: Uuid) -> PersonKey {
    let value = uuid.as_u128();
    let folded = (value as u32)
        ^ ((value >> 32) as u32)
        ^ ((value >> 64) as u32)
        ^ ((value >> 96) as u32);
    (folded & i32::MAX as u32) as PersonKey
}

#[cfg(test)]
mod tests {
    use super::{key_from_uuid, CollectionStore};
    use crate::model::person::{Coordinates, Person};
    use uuid::Uuid;

    #[test]
    fn generated_keys_are_non_negative() {
        for _ in 0..256 {
            assert!(key_from_uuid(Uuid::new_v4()) >= 0);
        }
        assert_eq!(key_from_uuid(Uuid::from_u128(u128::MAX)), 0);
    }

    #[test]
    fn insert_returns_distinct_keys() {
        let mut store = CollectionStore::new();
        let first = store.insert(Person::new("Alice", Coordinates::new(1.0, 1), 1));
        let second = store.insert(Person::new("Alice", Coordinates::new(1.0, 1), 1));
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sorted_keys_is_restartable() {
        let mut store = CollectionStore::new();
        for _ in 0..5 {
            store.insert(Person::new("Alice", Coordinates::new(1.0, 1), 1));
        }
        let first_pass = store.sorted_keys().collect::<Vec<_>>();
        let second_pass = store.sorted_keys().collect::<Vec<_>>();
        assert_eq!(first_pass, second_pass);
        assert!(first_pass.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
