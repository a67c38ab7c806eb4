use crate::{
    db::{
        cache::RecordCache,
        config::{StorageMode, StoreConfig},
        store::{MemoryStore, RedbStore, Store},
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use parking_lot::Mutex;
use std::{any::Any, collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, info};

/// File name of a table's primary store under directory storage.
pub const PRIMARY_FILE: &str = "primary.redb";

/// File name of a table's index store under directory storage.
pub const INDEX_FILE: &str = "index.redb";

///
/// StoreFactoryError
///

#[derive(Debug, ThisError)]
pub enum StoreFactoryError {
    #[error("table name '{0}' is not a valid store name")]
    InvalidTableName(String),

    #[error("table '{0}' is already open with a different record type")]
    RecordTypeMismatch(String),
}

impl StoreFactoryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidTableName(_) => ErrorClass::Unsupported,
            Self::RecordTypeMismatch(_) => ErrorClass::InvariantViolation,
        }
    }
}

impl From<StoreFactoryError> for InternalError {
    fn from(err: StoreFactoryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Store, err.to_string())
    }
}

/// Type-erased `Arc<RecordCache<T>>` shared by every handle on one pair.
type CacheSlot = Arc<Mutex<Option<Arc<dyn Any + Send + Sync>>>>;

///
/// StorePair
///
/// Bound pair of primary and index stores for one table name, plus the read
/// cache every table handle on that name shares.
///

#[derive(Clone)]
pub struct StorePair {
    pub primary: Arc<dyn Store>,
    pub index: Arc<dyn Store>,
    cache: CacheSlot,
}

impl StorePair {
    #[must_use]
    pub fn new(primary: Arc<dyn Store>, index: Arc<dyn Store>) -> Self {
        Self {
            primary,
            index,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Record cache for this pair, created with `capacity` on first use.
    ///
    /// Fails when the pair already caches a different record type.
    pub fn record_cache<T>(
        &self,
        name: &str,
        capacity: u64,
    ) -> Result<Arc<RecordCache<T>>, InternalError>
    where
        T: Clone + Send + 'static,
    {
        let mut slot = self.cache.lock();

        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing)
                .downcast::<RecordCache<T>>()
                .map_err(|_| StoreFactoryError::RecordTypeMismatch(name.to_string()).into());
        }

        let cache = Arc::new(RecordCache::<T>::new(capacity));
        *slot = Some(Arc::clone(&cache) as Arc<dyn Any + Send + Sync>);

        Ok(cache)
    }

    /// Close both stores, reporting the first failure.
    pub fn close(&self) -> Result<(), InternalError> {
        let primary = self.primary.close();
        let index = self.index.close();

        primary.and(index)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.primary.is_closed() || self.index.is_closed()
    }
}

///
/// StoreFactory
///
/// Opens store pairs for tables according to one `StoreConfig`.
///
/// Constructed once at startup and passed to every `Table::open`. Opening a
/// name that is already open hands back the same pair; a pair that has since
/// been closed is replaced with a fresh one.
///

pub struct StoreFactory {
    config: StoreConfig,
    open: Mutex<BTreeMap<String, StorePair>>,
}

impl StoreFactory {
    pub fn new(config: StoreConfig) -> Result<Self, InternalError> {
        config.validate()?;
        info!(storage = ?config.storage, cache_capacity = config.cache_capacity, "store factory ready");

        Ok(Self {
            config,
            open: Mutex::new(BTreeMap::new()),
        })
    }

    /// Factory over pure in-memory stores with default settings.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            config: StoreConfig::memory(),
            open: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open (or return the already-open) store pair for `name`.
    pub fn open(&self, name: &str) -> Result<StorePair, InternalError> {
        validate_table_name(name)?;

        let mut open = self.open.lock();
        if let Some(pair) = open.get(name) {
            if !pair.is_closed() {
                debug!(table = name, "store pair already open");
                return Ok(pair.clone());
            }
            // release whichever half is still open before reopening the files
            pair.close()?;
        }

        let pair = self.create(name)?;
        open.insert(name.to_string(), pair.clone());

        Ok(pair)
    }

    /// Names of tables whose store pair is currently open.
    #[must_use]
    pub fn open_tables(&self) -> Vec<String> {
        self.open
            .lock()
            .iter()
            .filter(|(_, pair)| !pair.is_closed())
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn create(&self, name: &str) -> Result<StorePair, InternalError> {
        let primary_name = format!("{name}/primary");
        let index_name = format!("{name}/index");

        let pair = match &self.config.storage {
            StorageMode::Memory => StorePair::new(
                Arc::new(MemoryStore::new(primary_name)),
                Arc::new(MemoryStore::new(index_name)),
            ),
            StorageMode::Directory { path } => {
                let dir = path.join(name);
                StorePair::new(
                    Arc::new(RedbStore::create(primary_name, &dir.join(PRIMARY_FILE))?),
                    Arc::new(RedbStore::create(index_name, &dir.join(INDEX_FILE))?),
                )
            }
        };

        Ok(pair)
    }
}

// names become directory names under directory storage
fn validate_table_name(name: &str) -> Result<(), StoreFactoryError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StoreFactoryError::InvalidTableName(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::Durability;
    use tempfile::TempDir;

    #[test]
    fn reopening_returns_the_same_pair() {
        let factory = StoreFactory::memory();
        let first = factory.open("users").expect("open should succeed");
        first
            .primary
            .set(b"1", b"row", Durability::Immediate)
            .expect("write should succeed");

        let second = factory.open("users").expect("reopen should succeed");

        assert!(
            Arc::ptr_eq(&first.primary, &second.primary),
            "reopening an open table should reuse its primary store"
        );
        assert_eq!(
            second.primary.get(b"1").expect("read should succeed"),
            Some(b"row".to_vec())
        );
        assert_eq!(factory.open_tables(), vec!["users".to_string()]);
    }

    #[test]
    fn closed_pair_is_replaced_on_open() {
        let factory = StoreFactory::memory();
        let first = factory.open("users").expect("open should succeed");
        first.close().expect("close should succeed");
        assert!(factory.open_tables().is_empty());

        let second = factory.open("users").expect("reopen should succeed");

        assert!(!second.is_closed());
        assert!(!Arc::ptr_eq(&first.primary, &second.primary));
    }

    #[test]
    fn directory_storage_lays_out_files_per_table() {
        let dir = TempDir::new().expect("tempdir");
        let factory =
            StoreFactory::new(StoreConfig::directory(dir.path())).expect("config should be valid");

        let pair = factory.open("orders").expect("open should succeed");
        pair.index
            .set(b"k", b"v", Durability::Immediate)
            .expect("write should succeed");
        pair.close().expect("close should succeed");

        assert!(dir.path().join("orders").join(PRIMARY_FILE).exists());
        assert!(dir.path().join("orders").join(INDEX_FILE).exists());

        let reopened = factory.open("orders").expect("reopen should succeed");
        assert_eq!(
            reopened.index.get(b"k").expect("read should succeed"),
            Some(b"v".to_vec())
        );
    }

    #[test]
    fn invalid_table_names_are_rejected() {
        let factory = StoreFactory::memory();

        for name in ["", ".", "..", "a/b", "a\\b"] {
            let err = factory.open(name).err().expect("name should be rejected");
            assert_eq!(err.class, ErrorClass::Unsupported);
            assert_eq!(err.origin, ErrorOrigin::Store);
        }
    }

    #[test]
    fn record_cache_is_shared_per_pair_and_typed() {
        let factory = StoreFactory::memory();
        let pair = factory.open("users").expect("open should succeed");
        let again = factory.open("users").expect("reopen should succeed");

        let first = pair
            .record_cache::<String>("users", 10)
            .expect("first cache should be created");
        let second = again
            .record_cache::<String>("users", 10)
            .expect("cache should be reused");
        assert!(
            Arc::ptr_eq(&first, &second),
            "handles on one pair should share a cache"
        );

        let err = pair
            .record_cache::<u64>("users", 10)
            .err()
            .expect("a different record type should be rejected");
        assert_eq!(err.class, ErrorClass::InvariantViolation);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = StoreFactory::new(StoreConfig::memory().with_shard_token_len(0));

        assert!(result.is_err());
    }
}
