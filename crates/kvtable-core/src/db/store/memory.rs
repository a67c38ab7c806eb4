use crate::{
    db::store::{Durability, Row, Store},
    error::InternalError,
};
use parking_lot::RwLock;
use std::{collections::BTreeMap, ops::Bound};

///
/// MemoryStore
///
/// Pure in-memory sorted store; nothing touches disk and durability
/// requests are accepted but have no effect.
///

pub struct MemoryStore {
    name: String,
    rows: RwLock<Option<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(Some(BTreeMap::new())),
        }
    }

    /// Number of stored rows; zero once closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().as_ref().map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError> {
        let rows = self.rows.read();
        let rows = rows
            .as_ref()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;

        Ok(rows.get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8], _durability: Durability) -> Result<(), InternalError> {
        let mut rows = self.rows.write();
        let rows = rows
            .as_mut()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;
        rows.insert(key.to_vec(), value.to_vec());

        Ok(())
    }

    fn delete(&self, key: &[u8], _durability: Durability) -> Result<(), InternalError> {
        let mut rows = self.rows.write();
        let rows = rows
            .as_mut()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;
        rows.remove(key);

        Ok(())
    }

    fn read_chunk(
        &self,
        lower: Bound<&[u8]>,
        upper: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<Row>, InternalError> {
        let rows = self.rows.read();
        let rows = rows
            .as_ref()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;

        if range_is_empty(lower, upper) {
            return Ok(Vec::new());
        }

        let upper = upper.map_or(Bound::Unbounded, Bound::Excluded);
        let chunk = rows
            .range::<[u8], _>((lower, upper))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(chunk)
    }

    fn close(&self) -> Result<(), InternalError> {
        self.rows.write().take();

        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.rows.read().is_none()
    }
}

/// Whether `[lower, upper)` cannot contain any key.
pub(crate) fn range_is_empty(lower: Bound<&[u8]>, upper: Option<&[u8]>) -> bool {
    let Some(upper) = upper else {
        return false;
    };

    match lower {
        Bound::Included(lower) | Bound::Excluded(lower) => lower >= upper,
        Bound::Unbounded => false,
    }
}
