use super::*;
use crate::error::ErrorClass;
use tempfile::TempDir;

fn stores(dir: &TempDir) -> Vec<Box<dyn Store>> {
    vec![
        Box::new(MemoryStore::new("mem")),
        Box::new(RedbStore::in_memory("redb-mem").unwrap()),
        Box::new(RedbStore::create("redb-file", &dir.path().join("t/primary.redb")).unwrap()),
    ]
}

fn keys(cursor: ScanCursor<'_>) -> Vec<Vec<u8>> {
    cursor.map(|row| row.unwrap().0).collect()
}

#[test]
fn get_set_delete_roundtrip() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        assert_eq!(store.get(b"a").unwrap(), None, "{}", store.name());

        store.set(b"a", b"one", Durability::Immediate).unwrap();
        store.set(b"a", b"two", Durability::Eventual).unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"two".to_vec()));

        store.delete(b"a", Durability::Immediate).unwrap();
        assert_eq!(store.get(b"a").unwrap(), None);

        // deleting a missing key is a no-op
        store.delete(b"missing", Durability::Immediate).unwrap();
    }
}

#[test]
fn scan_is_ordered_and_bounded() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        for key in ["c", "a", "d", "b"] {
            store
                .set(key.as_bytes(), key.as_bytes(), Durability::Immediate)
                .unwrap();
        }

        let all = keys(store.scan(b"", None));
        assert_eq!(all, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);

        let mid = keys(store.scan(b"b", Some(b"d".as_slice())));
        assert_eq!(mid, vec![b"b".to_vec(), b"c".to_vec()]);

        // inverted bounds yield nothing rather than panicking
        assert!(keys(store.scan(b"d", Some(b"a".as_slice()))).is_empty());
    }
}

#[test]
fn scan_prefix_stops_at_prefix_end() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        for key in ["idx-a", "idx-b", "idx_x", "idy-a", "id"] {
            store
                .set(key.as_bytes(), b"v", Durability::Immediate)
                .unwrap();
        }

        let found = keys(store.scan_prefix(b"idx-"));
        assert_eq!(found, vec![b"idx-a".to_vec(), b"idx-b".to_vec()]);
    }
}

#[test]
fn scan_spans_multiple_chunks() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        let total = SCAN_CHUNK_ROWS * 2 + 7;
        for i in 0..total {
            let key = format!("k{i:05}");
            store
                .set(key.as_bytes(), b"v", Durability::Eventual)
                .unwrap();
        }

        let found = keys(store.scan_prefix(b"k"));
        assert_eq!(found.len(), total);
        assert!(found.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn delete_while_scanning_does_not_block() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        for i in 0..10 {
            let key = format!("k{i}");
            store
                .set(key.as_bytes(), b"v", Durability::Immediate)
                .unwrap();
        }

        let mut seen = 0;
        for row in store.scan_prefix(b"k") {
            let (key, _) = row.unwrap();
            store.delete(&key, Durability::Eventual).unwrap();
            seen += 1;
        }

        assert_eq!(seen, 10);
        assert!(keys(store.scan(b"", None)).is_empty());
    }
}

#[test]
fn closed_store_rejects_operations() {
    let dir = TempDir::new().unwrap();

    for store in stores(&dir) {
        store.set(b"a", b"v", Durability::Immediate).unwrap();
        assert!(!store.is_closed());

        store.close().unwrap();
        assert!(store.is_closed());

        let err = store.get(b"a").unwrap_err();
        assert_eq!(err.class, ErrorClass::Closed);
        assert!(store.set(b"a", b"v", Durability::Immediate).unwrap_err().is_closed());
        assert!(store.delete(b"a", Durability::Immediate).unwrap_err().is_closed());

        let mut cursor = store.scan(b"", None);
        assert!(cursor.next().unwrap().unwrap_err().is_closed());
        assert!(cursor.next().is_none());
    }
}

#[test]
fn redb_file_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users/primary.redb");

    let store = RedbStore::create("users/primary", &path).unwrap();
    store.set(b"1", b"alice", Durability::Immediate).unwrap();
    store.close().unwrap();

    let reopened = RedbStore::create("users/primary", &path).unwrap();
    assert_eq!(reopened.get(b"1").unwrap(), Some(b"alice".to_vec()));
}

#[test]
fn memory_store_len_tracks_rows() {
    let store = MemoryStore::new("mem");
    assert!(store.is_empty());

    store.set(b"a", b"v", Durability::Immediate).unwrap();
    store.set(b"b", b"v", Durability::Immediate).unwrap();
    assert_eq!(store.len(), 2);

    store.close().unwrap();
    assert_eq!(store.len(), 0);
}

#[test]
fn prefix_upper_bound_increments_last_non_max_byte() {
    assert_eq!(prefix_upper_bound(b"abc"), Some(b"abd".to_vec()));
    assert_eq!(prefix_upper_bound(&[0x61, 0xff]), Some(vec![0x62]));
    assert_eq!(prefix_upper_bound(&[0xff, 0xff]), None);
    assert_eq!(prefix_upper_bound(b""), None);
}
