//! Domain model for the person collection.
//!
//! # Responsibility
//! - Define the record shape stored in the collection.
//! - Define the total order used by `replace_if_greater`.
//!
//! # Invariants
//! - Absent optional fields sort before any present value.
//! - `creation_date` is assigned by the builder, never by user input.

pub mod person;
