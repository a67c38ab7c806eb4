//! ## Crate layout
//! - `db`: store backends, store factory, record cache, and the typed `Table`.
//! - `error`: the classified `InternalError` returned by fallible operations.
//! - `key`: primary and index key encoding.
//! - `model`: field declarations and the derived index schema.
//! - `serialize`: the record codec.
//! - `traits`: the `Record` contract implemented by `#[derive(Record)]`.
//!
//! The `prelude` module carries what a caller needs to declare a record type
//! and open a table.

pub use kvtable_core::{db, error, key, model, serialize, traits};

/// `#[derive(Record)]`, see [`traits::Record`].
pub use kvtable_derive::Record;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::Record;
    pub use kvtable_core::prelude::*;
}
