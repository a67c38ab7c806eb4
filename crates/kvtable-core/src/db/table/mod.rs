mod window;


pub use window::Window;

use crate::{
    db::{
        cache::RecordCache,
        factory::{StoreFactory, StorePair},
        store::{Durability, Store},
    },
    error::InternalError,
    key::{IndexKey, IndexLookup, primary_key},
    model::index::{IndexInfo, IndexSchema},
    serialize::{deserialize, serialize},
    traits::Record,
};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, warn};
use window::WindowCursor;

/// Cache cost charged for every cached record.
pub const RECORD_CACHE_COST: u64 = 1;

///
/// Table
///
/// Typed table over a primary store (id → encoded record) and an index store
/// (index key → id), fronted by a read cache.
///
/// ## Consistency
/// There is no transaction spanning the two stores. Writes land on the primary
/// store first on insert and last on update; index entries are best-effort and
/// every read path tolerates entries that point at missing, corrupt, or changed
/// records.
///
/// ## Errors
/// Single-record writes return errors. Reads and listings never do: a
/// failing record is logged and left out of the result.
///

pub struct Table<T: Record> {
    name: String,
    indexes: Arc<IndexSchema>,
    stores: StorePair,
    cache: Arc<RecordCache<T>>,
    shard_token_len: usize,
}

impl<T: Record> Table<T> {
    /// Open the table `name`, deriving its index schema from `T`.
    pub fn open(factory: &StoreFactory, name: &str) -> Result<Self, InternalError> {
        let indexes = IndexSchema::of::<T>();
        indexes.validate()?;

        let stores = factory.open(name)?;
        let config = factory.config();
        let cache = stores.record_cache::<T>(name, config.cache_capacity)?;
        info!(table = name, indexes = %indexes, "table opened");

        Ok(Self {
            name: name.to_string(),
            indexes,
            stores,
            cache,
            shard_token_len: config.shard_token_len,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn indexes(&self) -> &IndexSchema {
        &self.indexes
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stores.is_closed()
    }

    ///
    /// READS
    ///

    /// Fetch a record; failures (including a closed table) read as absent.
    pub fn get(&self, id: &str) -> Option<T> {
        self.try_get(id).unwrap_or_else(|err| {
            self.log_read_error(id, &err);
            None
        })
    }

    /// Fetch a record, surfacing backend failures.
    ///
    /// A stored payload that fails to decode is deleted and reads as absent.
    pub fn try_get(&self, id: &str) -> Result<Option<T>, InternalError> {
        self.ensure_open()?;

        if let Some(record) = self.cache.get(id) {
            return Ok(Some(record));
        }

        let Some(bytes) = self.stores.primary.get(primary_key(id))? else {
            return Ok(None);
        };

        match deserialize::<T>(&bytes) {
            Ok(record) => {
                self.cache.insert(id, record.clone(), RECORD_CACHE_COST);
                Ok(Some(record))
            }
            Err(err) => {
                warn!(table = %self.name, id, error = %err, "corrupt record, deleting");
                self.cache.remove(id);
                self.stores.primary.delete(primary_key(id), Durability::Eventual)?;
                Ok(None)
            }
        }
    }

    /// Fetch several records in input order, omitting missing ids.
    pub fn gets<I: AsRef<str>>(&self, ids: &[I]) -> Vec<T> {
        ids.iter().filter_map(|id| self.get(id.as_ref())).collect()
    }

    /// Records whose id starts with `prefix`, in id order, that pass `filter`
    /// and fall inside `window`.
    pub fn search(
        &self,
        prefix: &str,
        mut filter: impl FnMut(&T) -> bool,
        window: Window,
    ) -> Vec<T> {
        let mut cursor = WindowCursor::new(window);
        let mut out = Vec::new();
        if cursor.exhausted() {
            return out;
        }

        self.walk_primary(prefix.as_bytes(), |record| {
            if filter(&record) && cursor.accept_matching_row() {
                out.push(record);
            }
            !cursor.exhausted()
        });

        out
    }

    /// Records reachable through index `index` whose indexed value matches
    /// `value`, in index-key order.
    ///
    /// `"*"` lists every entry, `""` selects records whose indexed field is
    /// empty, anything else is a prefix match on the field value. An unknown
    /// index yields no records. Each record is listed at most once, even when
    /// leftover sharded entries still carry its current value.
    pub fn search_by_index(
        &self,
        index: &str,
        value: &str,
        mut filter: impl FnMut(&T) -> bool,
        window: Window,
    ) -> Vec<T> {
        let Some(info) = self.indexes.get(index) else {
            debug!(table = %self.name, index, "lookup on unknown index");
            return Vec::new();
        };

        let lookup = IndexLookup::from_value(value);
        let prefix = IndexKey::scan_prefix(info, lookup);
        let mut cursor = WindowCursor::new(window);
        let mut out = Vec::new();
        if cursor.exhausted() {
            return out;
        }
        let mut seen = HashSet::new();

        let index_store: &dyn Store = self.stores.index.as_ref();
        for row in index_store.scan_prefix(&prefix) {
            let key = match row {
                Ok((key, _)) => key,
                Err(err) => {
                    self.log_read_error(index, &err);
                    break;
                }
            };

            let entry = match IndexKey::parse(info, &key) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(table = %self.name, index, error = %err, "skipping malformed index key");
                    continue;
                }
            };
            if !lookup.matches(&entry.value) || seen.contains(&entry.id) {
                continue;
            }

            let Some(record) = self.resolve_entry(info, &key, &entry) else {
                continue;
            };
            seen.insert(entry.id);
            if filter(&record) && cursor.accept_matching_row() {
                out.push(record);
            }
            if cursor.exhausted() {
                break;
            }
        }

        out
    }

    /// Visit every record in id order until `handle` returns `false`.
    pub fn scan(&self, mut handle: impl FnMut(&T) -> bool) {
        self.walk_primary(&[], |record| handle(&record));
    }

    ///
    /// WRITES
    ///

    /// Store `record` under `id`, then write its index entries.
    ///
    /// A failed primary write is returned and no index entry is written.
    /// Index writes after that are best-effort.
    pub fn insert(&self, id: &str, record: &T) -> Result<(), InternalError> {
        self.ensure_open()?;

        let bytes = serialize(record)?;
        self.stores
            .primary
            .set(primary_key(id), &bytes, Durability::Immediate)?;
        self.cache.remove(id);

        for info in self.indexes.values() {
            if let Some(text) = record.field_text(info.field) {
                self.put_index_entry(info, &text, id);
            }
        }

        Ok(())
    }

    /// Merge the set fields of `patch` into the stored record.
    pub fn update(&self, id: &str, patch: T::Patch) -> Result<(), InternalError> {
        let touched = self
            .indexes
            .values()
            .filter(|info| T::patch_touches(&patch, info.field))
            .map(|info| info.name)
            .collect::<Vec<_>>();

        self.rewrite(
            id,
            |info| touched.contains(&info.name),
            |mut record| {
                record.merge(patch);
                record
            },
        )
    }

    /// Replace the stored record wholesale.
    pub fn replace(&self, id: &str, record: T) -> Result<(), InternalError> {
        self.rewrite(id, |_| true, |_| record)
    }

    /// Edit the stored record in place through `edit`.
    pub fn modify(&self, id: &str, edit: impl FnOnce(&mut T)) -> Result<(), InternalError> {
        self.rewrite(
            id,
            |_| true,
            |mut record| {
                edit(&mut record);
                record
            },
        )
    }

    /// Delete records and their reconstructible index entries.
    ///
    /// Missing ids are skipped. Sharded index entries cannot be rebuilt from
    /// the record and are left for lookups to skip.
    pub fn delete<I: AsRef<str>>(&self, ids: &[I]) {
        for id in ids {
            let id = id.as_ref();
            if let Err(err) = self.delete_one(id) {
                warn!(table = %self.name, id, error = %err, "delete failed");
            }
        }
    }

    /// Release both stores; later writes fail and reads come back empty.
    pub fn close(&self) -> Result<(), InternalError> {
        self.cache.clear();
        self.stores.close()?;
        info!(table = %self.name, "table closed");

        Ok(())
    }

    ///
    /// INTERNAL
    ///

    fn ensure_open(&self) -> Result<(), InternalError> {
        if self.stores.primary.is_closed() {
            return Err(InternalError::store_closed(self.stores.primary.name()));
        }
        if self.stores.index.is_closed() {
            return Err(InternalError::store_closed(self.stores.index.name()));
        }

        Ok(())
    }

    // Shared update path: index maintenance first, then the primary write,
    // then cache invalidation.
    fn rewrite(
        &self,
        id: &str,
        touches: impl Fn(&IndexInfo) -> bool,
        build: impl FnOnce(T) -> T,
    ) -> Result<(), InternalError> {
        let Some(old) = self.try_get(id)? else {
            return Err(InternalError::not_found(&self.name, id));
        };

        let touched = self
            .indexes
            .values()
            .filter(|info| touches(info))
            .collect::<Vec<_>>();
        let new = build(old.clone());

        for info in touched {
            let old_text = old.field_text(info.field);
            let new_text = new.field_text(info.field);
            if old_text == new_text {
                continue;
            }

            if let Some(text) = old_text {
                self.remove_index_entry(info, &text, id);
            }
            if let Some(text) = new_text {
                self.put_index_entry(info, &text, id);
            }
        }

        let bytes = serialize(&new)?;
        self.stores
            .primary
            .set(primary_key(id), &bytes, Durability::Immediate)?;
        self.cache.remove(id);
        debug!(table = %self.name, id, "record updated, cache entry dropped");

        Ok(())
    }

    fn delete_one(&self, id: &str) -> Result<(), InternalError> {
        if let Some(record) = self.try_get(id)? {
            for info in self.indexes.values() {
                if let Some(text) = record.field_text(info.field) {
                    self.remove_index_entry(info, &text, id);
                }
            }
        }

        self.cache.remove(id);
        self.stores
            .primary
            .delete(primary_key(id), Durability::Immediate)
    }

    fn put_index_entry(&self, info: &IndexInfo, text: &str, id: &str) {
        let result = IndexKey::build(info, text, id, self.shard_token_len)
            .map_err(InternalError::from)
            .and_then(|key| {
                self.stores
                    .index
                    .set(&key, id.as_bytes(), Durability::Immediate)
            });

        if let Err(err) = result {
            warn!(table = %self.name, index = info.name, id, error = %err, "index write failed");
        }
    }

    fn remove_index_entry(&self, info: &IndexInfo, text: &str, id: &str) {
        let result = IndexKey::unsharded(info, text, id)
            .map_err(InternalError::from)
            .and_then(|key| self.stores.index.delete(&key, Durability::Immediate));

        if let Err(err) = result {
            warn!(table = %self.name, index = info.name, id, error = %err, "index delete failed");
        }
    }

    // Resolve one index entry to its record.
    //
    // Entries whose record is gone (or was corrupt and has just been deleted)
    // are removed. Entries whose record no longer carries the entry's value
    // are skipped: an update may have written the new entry moments before
    // the primary record.
    fn resolve_entry(&self, info: &IndexInfo, key: &[u8], entry: &IndexKey) -> Option<T> {
        match self.try_get(&entry.id) {
            Ok(Some(record)) => {
                if record.field_text(info.field).as_deref() == Some(entry.value.as_str()) {
                    Some(record)
                } else {
                    debug!(table = %self.name, index = info.name, id = %entry.id, "skipping stale index entry");
                    None
                }
            }
            Ok(None) => {
                warn!(table = %self.name, index = info.name, id = %entry.id, "dangling index entry, deleting");
                if let Err(err) = self.stores.index.delete(key, Durability::Eventual) {
                    warn!(table = %self.name, index = info.name, error = %err, "index delete failed");
                }
                None
            }
            Err(err) => {
                self.log_read_error(&entry.id, &err);
                None
            }
        }
    }

    // Ordered walk over primary rows under `prefix`; the cache is consulted
    // before decoding. Undecodable rows are skipped.
    fn walk_primary(&self, prefix: &[u8], mut visit: impl FnMut(T) -> bool) {
        let primary: &dyn Store = self.stores.primary.as_ref();

        for row in primary.scan_prefix(prefix) {
            let (key, bytes) = match row {
                Ok(row) => row,
                Err(err) => {
                    self.log_read_error("<scan>", &err);
                    return;
                }
            };

            let record = match std::str::from_utf8(&key).ok().and_then(|id| self.cache.get(id)) {
                Some(record) => record,
                None => match deserialize::<T>(&bytes) {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(
                            table = %self.name,
                            id = %String::from_utf8_lossy(&key),
                            error = %err,
                            "skipping undecodable record"
                        );
                        continue;
                    }
                },
            };

            if !visit(record) {
                return;
            }
        }
    }

    fn log_read_error(&self, subject: &str, err: &InternalError) {
        if err.is_closed() {
            debug!(table = %self.name, subject, "read on closed table");
        } else {
            warn!(table = %self.name, subject, error = %err.display_with_class(), "read failed");
        }
    }
}
