//! Runtime data model definitions.
//!
//! Record types declare their fields (and the raw tag text attached to each
//! field) at compile time through [`crate::traits::Record::FIELDS`]. This
//! module turns those declarations into the runtime index schema that the key
//! codec and the table engine consume.
//!
//! In general:
//! - `#[derive(Record)]` defines *what exists*
//! - `model` defines *what runs*
pub mod field;
pub mod index;

#[cfg(test)]
mod tests;
