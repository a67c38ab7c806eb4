use crate::{
    error::InternalError,
    key::{NAME_DELIMITER, SEPARATOR, SHARD_DELIMITER},
    model::field::{FieldModel, FieldTag},
    traits::Record,
};
use derive_more::Deref;
use parking_lot::RwLock;
use std::{
    any::TypeId,
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
    sync::{Arc, OnceLock},
};
use tracing::warn;

///
/// IndexInfo
/// One secondary index derived from a record type's field tags.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexInfo {
    pub name: &'static str,
    pub field: &'static str,
    pub value_type: &'static str,
    pub sharded: bool,
}

impl IndexInfo {
    #[must_use]
    pub const fn new(
        name: &'static str,
        field: &'static str,
        value_type: &'static str,
        sharded: bool,
    ) -> Self {
        Self {
            name,
            field,
            value_type,
            sharded,
        }
    }
}

impl Display for IndexInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sharded {
            write!(f, "{}({}: {}) sharded", self.name, self.field, self.value_type)
        } else {
            write!(f, "{}({}: {})", self.name, self.field, self.value_type)
        }
    }
}

///
/// IndexSchema
///
/// Immutable name → index mapping for one record type.
/// Ordered by index name so iteration (and logging) is deterministic.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct IndexSchema(BTreeMap<&'static str, IndexInfo>);

impl IndexSchema {
    /// Derive (once per process) and return the schema for `T`.
    pub fn of<T: Record>() -> Arc<Self> {
        static SCHEMAS: OnceLock<RwLock<HashMap<TypeId, Arc<IndexSchema>>>> = OnceLock::new();

        let schemas = SCHEMAS.get_or_init(|| RwLock::new(HashMap::new()));
        let type_id = TypeId::of::<T>();

        if let Some(schema) = schemas.read().get(&type_id) {
            return Arc::clone(schema);
        }

        Arc::clone(
            schemas
                .write()
                .entry(type_id)
                .or_insert_with(|| Arc::new(Self::from_fields(T::FIELDS))),
        )
    }

    /// Build a schema from declared fields.
    ///
    /// Primary-key and untagged fields are skipped. When two fields declare the
    /// same index name the later field replaces the earlier one.
    #[must_use]
    pub fn from_fields(fields: &'static [FieldModel]) -> Self {
        let mut indexes = BTreeMap::new();

        for field in fields {
            let FieldTag::Index { name, sharded } = FieldTag::parse(field.tag) else {
                continue;
            };

            let info = IndexInfo::new(name, field.name, field.ty, sharded);
            if let Some(previous) = indexes.insert(name, info) {
                warn!(
                    index = name,
                    previous = previous.field,
                    field = field.name,
                    "duplicate index name, later field wins"
                );
            }
        }

        Self(indexes)
    }

    /// Reject index names the key codec cannot encode unambiguously.
    pub fn validate(&self) -> Result<(), InternalError> {
        for info in self.0.values() {
            if info.name.is_empty() {
                return Err(InternalError::index_invariant(format!(
                    "field '{}' declares an index with an empty name",
                    info.field
                )));
            }

            if info.name.contains(NAME_DELIMITER) || info.name.contains(char::from(SEPARATOR)) {
                return Err(InternalError::index_invariant(format!(
                    "index name '{}' contains a reserved character",
                    info.name
                )));
            }

            if info.sharded {
                let shard_prefix = format!("{}{SHARD_DELIMITER}", info.name);
                if let Some(other) = self.0.keys().find(|name| name.starts_with(&shard_prefix)) {
                    return Err(InternalError::index_invariant(format!(
                        "sharded index '{}' overlaps the key range of index '{other}'",
                        info.name
                    )));
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexInfo> {
        self.0.get(name)
    }
}

impl Display for IndexSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.0.values().map(ToString::to_string).collect::<Vec<_>>();
        write!(f, "[{}]", parts.join(", "))
    }
}
