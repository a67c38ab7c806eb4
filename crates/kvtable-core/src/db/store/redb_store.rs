use crate::{
    db::store::{Durability, Row, Store, memory::range_is_empty},
    error::InternalError,
};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::{fmt::Display, fs, ops::Bound, path::Path};

/// Single table holding every row of one store.
const ROWS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("rows");

///
/// RedbStore
///
/// Sorted store backed by one redb database.
/// `Durability::Immediate` commits with an fsync; `Eventual` commits without.
///

pub struct RedbStore {
    name: String,
    db: RwLock<Option<Database>>,
}

impl RedbStore {
    /// Open or create the database file at `path`, creating parent directories.
    pub fn create(name: impl Into<String>, path: &Path) -> Result<Self, InternalError> {
        let name = name.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| io(&name, err))?;
        }

        let db = Database::create(path).map_err(|err| io(&name, err))?;

        Self::init(name, db)
    }

    /// Database held entirely in memory by redb's in-memory backend.
    #[cfg(test)]
    pub fn in_memory(name: impl Into<String>) -> Result<Self, InternalError> {
        let name = name.into();
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|err| io(&name, err))?;

        Self::init(name, db)
    }

    // make sure the row table exists so readers never see TableDoesNotExist
    fn init(name: String, db: Database) -> Result<Self, InternalError> {
        let txn = db.begin_write().map_err(|err| io(&name, err))?;
        txn.open_table(ROWS).map_err(|err| io(&name, err))?;
        txn.commit().map_err(|err| io(&name, err))?;

        Ok(Self {
            name,
            db: RwLock::new(Some(db)),
        })
    }

    fn write(
        &self,
        durability: Durability,
        apply: impl FnOnce(&mut redb::Table<'_, &'static [u8], &'static [u8]>) -> Result<(), redb::StorageError>,
    ) -> Result<(), InternalError> {
        let db = self.db.read();
        let db = db
            .as_ref()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;

        let mut txn = db.begin_write().map_err(|err| io(&self.name, err))?;
        txn.set_durability(match durability {
            Durability::Immediate => redb::Durability::Immediate,
            Durability::Eventual => redb::Durability::Eventual,
        });
        {
            let mut table = txn.open_table(ROWS).map_err(|err| io(&self.name, err))?;
            apply(&mut table).map_err(|err| io(&self.name, err))?;
        }
        txn.commit().map_err(|err| io(&self.name, err))
    }
}

impl Store for RedbStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError> {
        let db = self.db.read();
        let db = db
            .as_ref()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;

        let txn = db.begin_read().map_err(|err| io(&self.name, err))?;
        let table = txn.open_table(ROWS).map_err(|err| io(&self.name, err))?;
        let value = table.get(key).map_err(|err| io(&self.name, err))?;

        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8], durability: Durability) -> Result<(), InternalError> {
        self.write(durability, |table| table.insert(key, value).map(|_| ()))
    }

    fn delete(&self, key: &[u8], durability: Durability) -> Result<(), InternalError> {
        self.write(durability, |table| table.remove(key).map(|_| ()))
    }

    fn read_chunk(
        &self,
        lower: Bound<&[u8]>,
        upper: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<Row>, InternalError> {
        let db = self.db.read();
        let db = db
            .as_ref()
            .ok_or_else(|| InternalError::store_closed(&self.name))?;

        if range_is_empty(lower, upper) {
            return Ok(Vec::new());
        }

        let txn = db.begin_read().map_err(|err| io(&self.name, err))?;
        let table = txn.open_table(ROWS).map_err(|err| io(&self.name, err))?;
        let upper = upper.map_or(Bound::Unbounded, Bound::Excluded);
        let range = table
            .range::<&[u8]>((lower, upper))
            .map_err(|err| io(&self.name, err))?;

        let mut rows = Vec::with_capacity(limit.min(64));
        for entry in range.take(limit) {
            let (key, value) = entry.map_err(|err| io(&self.name, err))?;
            rows.push((key.value().to_vec(), value.value().to_vec()));
        }

        Ok(rows)
    }

    fn close(&self) -> Result<(), InternalError> {
        // dropping the handle releases the file lock
        self.db.write().take();

        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }
}

fn io(name: &str, err: impl Display) -> InternalError {
    InternalError::store_io(format!("store '{name}': {err}"))
}
