mod value;

pub use value::*;

pub use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::model::field::FieldModel;

///
/// Record
///
/// A typed value stored in a table.
///
/// ## Semantics
/// - The primary identifier is supplied by the caller, never derived from the record.
/// - `FIELDS` is the declarative schema; index metadata is parsed from its tags.
/// - `Patch` is the partial-update payload: every field optional, unset means unchanged.
///
/// Usually implemented with `#[derive(Record)]`.
///

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial update payload accepted by `Table::update`.
    type Patch: Default + Send;

    /// Declared fields, in declaration order.
    const FIELDS: &'static [FieldModel];

    /// Render an indexed field as key text; `None` when the field is absent.
    fn field_text(&self, field: &str) -> Option<String>;

    /// Merge the set fields of `patch` into self.
    fn merge(&mut self, patch: Self::Patch);

    /// Whether `patch` sets `field`.
    fn patch_touches(patch: &Self::Patch, field: &str) -> bool;
}
