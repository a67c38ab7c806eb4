//! Core runtime for kvtable: typed tables over sorted key-value stores with
//! tag-declared secondary indexes, a cost-aware read cache, and windowed
//! prefix search.
#![warn(unreachable_pub)]

extern crate self as kvtable;

// public exports are one module level down
pub mod db;
pub mod error;
pub mod key;
pub mod model;
pub mod serialize;
pub mod traits;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Everything needed to declare a record type and work with a table.
///

pub mod prelude {
    pub use crate::{
        db::{StoreConfig, StoreFactory, Table, Window},
        error::InternalError,
        key::MATCH_ALL,
        traits::{Deserialize, Record, Serialize},
    };
}
