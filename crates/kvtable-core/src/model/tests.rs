use crate::{
    error::ErrorClass,
    model::{
        field::{FieldModel, FieldTag},
        index::IndexSchema,
    },
    test_fixtures::UserDemo,
};
use std::sync::Arc;

#[test]
fn tag_parsing_recognizes_index_and_shard_flag() {
    assert_eq!(
        FieldTag::parse("index:idx_name"),
        FieldTag::Index {
            name: "idx_name",
            sharded: false
        }
    );
    assert_eq!(
        FieldTag::parse("index:idx_addr|r"),
        FieldTag::Index {
            name: "idx_addr",
            sharded: true
        }
    );
    assert_eq!(FieldTag::parse(""), FieldTag::Untagged);
    assert_eq!(FieldTag::parse("json:name"), FieldTag::Untagged);
}

#[test]
fn tag_parsing_handles_parts_and_primary_key() {
    assert_eq!(FieldTag::parse("primaryKey"), FieldTag::PrimaryKey);
    assert_eq!(
        FieldTag::parse("index:idx_id;primary_key"),
        FieldTag::PrimaryKey,
        "a primary-key part excludes the field even after an index part"
    );
    assert_eq!(
        FieldTag::parse("index:idx_a; comment text"),
        FieldTag::Index {
            name: "idx_a",
            sharded: false
        }
    );
    assert_eq!(
        FieldTag::parse("index:first;index:second|r"),
        FieldTag::Index {
            name: "first",
            sharded: false
        }
    );
}

#[test]
fn schema_skips_primary_key_and_untagged_fields() {
    static FIELDS: [FieldModel; 4] = [
        FieldModel::new("id", "String", "primaryKey"),
        FieldModel::new("name", "String", "index:idx_name"),
        FieldModel::new("age", "u32", ""),
        FieldModel::new("addr", "String", "index:idx_addr|r"),
    ];

    let schema = IndexSchema::from_fields(&FIELDS);

    assert_eq!(schema.len(), 2);
    let name = schema.get("idx_name").expect("idx_name should exist");
    assert_eq!((name.field, name.value_type, name.sharded), ("name", "String", false));
    assert!(schema.get("idx_addr").is_some_and(|info| info.sharded));
    assert!(schema.validate().is_ok());
    assert_eq!(
        schema.to_string(),
        "[idx_addr(addr: String) sharded, idx_name(name: String)]"
    );
}

#[test]
fn duplicate_index_name_keeps_later_field() {
    static FIELDS: [FieldModel; 2] = [
        FieldModel::new("first", "String", "index:idx_dup"),
        FieldModel::new("second", "u64", "index:idx_dup|r"),
    ];

    let schema = IndexSchema::from_fields(&FIELDS);

    assert_eq!(schema.len(), 1);
    let info = schema.get("idx_dup").expect("idx_dup should exist");
    assert_eq!(info.field, "second");
    assert!(info.sharded);
}

#[test]
fn validate_rejects_unencodable_names() {
    static EMPTY: [FieldModel; 1] = [FieldModel::new("a", "String", "index:")];
    static DASHED: [FieldModel; 1] = [FieldModel::new("a", "String", "index:idx-a")];
    static OVERLAP: [FieldModel; 2] = [
        FieldModel::new("a", "String", "index:idx|r"),
        FieldModel::new("b", "String", "index:idx_b"),
    ];

    for fields in [&EMPTY[..], &DASHED[..], &OVERLAP[..]] {
        let err = IndexSchema::from_fields(fields)
            .validate()
            .expect_err("schema should be rejected");
        assert_eq!(err.class, ErrorClass::InvariantViolation);
    }
}

#[test]
fn schema_is_derived_once_per_type() {
    let first = IndexSchema::of::<UserDemo>();
    let second = IndexSchema::of::<UserDemo>();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        first.keys().copied().collect::<Vec<_>>(),
        vec!["idx_addr", "idx_count", "idx_name"]
    );
}
