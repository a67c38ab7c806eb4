mod cursor;
mod memory;
mod redb_store;

#[cfg(test)]
mod tests;

pub use cursor::*;
pub use memory::*;
pub use redb_store::*;

use crate::error::InternalError;
use std::ops::Bound;

/// Rows fetched per chunk by a [`ScanCursor`].
pub const SCAN_CHUNK_ROWS: usize = 128;

/// One key/value row read from a store.
pub type Row = (Vec<u8>, Vec<u8>);

///
/// Durability
/// Commit guarantee requested for a single write.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Durability {
    /// Persisted (fsync-equivalent) before the write returns.
    #[default]
    Immediate,
    /// May be lost on crash until a later immediate write.
    Eventual,
}

///
/// Store
///
/// Sorted byte-keyed storage backend.
///
/// Implementations must be internally thread-safe; the table engine adds no
/// locking of its own. Every operation after [`Store::close`] fails with a
/// `Closed`-class error.
///

pub trait Store: Send + Sync {
    /// Diagnostic name, used in logs and errors.
    fn name(&self) -> &str;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, InternalError>;

    fn set(&self, key: &[u8], value: &[u8], durability: Durability) -> Result<(), InternalError>;

    fn delete(&self, key: &[u8], durability: Durability) -> Result<(), InternalError>;

    /// Read up to `limit` rows in key order starting at `lower`, stopping
    /// before `upper` when given.
    fn read_chunk(
        &self,
        lower: Bound<&[u8]>,
        upper: Option<&[u8]>,
        limit: usize,
    ) -> Result<Vec<Row>, InternalError>;

    /// Release the backend handle.
    fn close(&self) -> Result<(), InternalError>;

    fn is_closed(&self) -> bool;
}

impl dyn Store {
    /// Ordered iteration over `[lower, upper)`; `upper = None` is unbounded.
    #[must_use]
    pub fn scan<'a>(&'a self, lower: &[u8], upper: Option<&[u8]>) -> ScanCursor<'a> {
        ScanCursor::new(self, lower.to_vec(), upper.map(<[u8]>::to_vec))
    }

    /// Ordered iteration over every key starting with `prefix`.
    #[must_use]
    pub fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> ScanCursor<'a> {
        let upper = prefix_upper_bound(prefix);

        ScanCursor::new(self, prefix.to_vec(), upper)
    }
}

/// Smallest key greater than every key starting with `prefix`.
///
/// `None` when no such key exists (empty prefix or all `0xff`).
#[must_use]
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let i = prefix.iter().rposition(|b| *b != 0xff)?;
    let mut upper = prefix[..i].to_vec();
    upper.push(prefix[i] + 1);

    Some(upper)
}
