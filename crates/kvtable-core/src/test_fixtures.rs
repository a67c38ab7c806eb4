use crate::{
    db::{factory::StoreFactory, table::Table},
    traits::{Deserialize, Serialize},
};
use kvtable_derive::Record;

///
/// UserDemo
///
/// Test record with one plain index, one sharded index, and unindexed fields.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Record, Serialize)]
pub struct UserDemo {
    #[kvtable("primaryKey")]
    pub id: String,

    #[kvtable("index:idx_name")]
    pub name: String,

    pub age: u32,

    #[kvtable("index:idx_addr|r")]
    pub addr: String,

    pub ok: bool,

    #[kvtable("index:idx_count")]
    pub count: Option<i64>,
}

impl UserDemo {
    pub fn new(id: &str, name: &str, addr: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            addr: addr.to_string(),
            ..Self::default()
        }
    }
}

/// Fresh in-memory table of `UserDemo` records.
pub fn user_table(name: &str) -> (StoreFactory, Table<UserDemo>) {
    let factory = StoreFactory::memory();
    let table = Table::open(&factory, name).expect("in-memory table should open");

    (factory, table)
}
