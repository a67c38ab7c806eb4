//! Storage side of the engine: store backends, the record cache, the store
//! factory, and the typed table built on top of them.

pub mod cache;
pub mod config;
pub mod factory;
pub mod store;
pub mod table;

pub use cache::RecordCache;
pub use config::{ConfigError, StorageMode, StoreConfig};
pub use factory::{StoreFactory, StorePair};
pub use store::{Durability, MemoryStore, RedbStore, ScanCursor, Store};
pub use table::{Table, Window};
